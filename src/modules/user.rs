//! User and privilege management.

use std::sync::Arc;

use crate::client::Pipeline;
use crate::error::Result;
use crate::parser;
use crate::query;
use crate::types::{Grant, Privilege, UserInfo};

/// User and privilege operations.
#[derive(Debug)]
pub struct UserClient {
    pipeline: Arc<Pipeline>,
}

impl UserClient {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// `SHOW USERS`.
    pub async fn get_users(&self) -> Result<Vec<UserInfo>> {
        let series = self.pipeline.execute(&query::user::show(), None).await?;
        parser::parse_users(&series)
    }

    /// `CREATE USER`, optionally with administrator rights.
    pub async fn create_user(&self, name: &str, password: &str, is_admin: bool) -> Result<()> {
        self.pipeline
            .execute(&query::user::create(name, password, is_admin), None)
            .await?;
        Ok(())
    }

    /// `DROP USER`.
    pub async fn drop_user(&self, name: &str) -> Result<()> {
        self.pipeline.execute(&query::user::drop(name), None).await?;
        Ok(())
    }

    /// `SET PASSWORD FOR`.
    pub async fn set_password(&self, name: &str, password: &str) -> Result<()> {
        self.pipeline
            .execute(&query::user::set_password(name, password), None)
            .await?;
        Ok(())
    }

    /// `GRANT ALL PRIVILEGES TO`.
    pub async fn grant_administrator(&self, name: &str) -> Result<()> {
        self.pipeline
            .execute(&query::user::grant_administrator(name), None)
            .await?;
        Ok(())
    }

    /// `REVOKE ALL PRIVILEGES FROM`.
    pub async fn revoke_administrator(&self, name: &str) -> Result<()> {
        self.pipeline
            .execute(&query::user::revoke_administrator(name), None)
            .await?;
        Ok(())
    }

    /// `GRANT <privilege> ON <database> TO`.
    pub async fn grant_privilege(
        &self,
        privilege: Privilege,
        database: &str,
        name: &str,
    ) -> Result<()> {
        self.pipeline
            .execute(&query::user::grant(privilege, database, name), None)
            .await?;
        Ok(())
    }

    /// `REVOKE <privilege> ON <database> FROM`.
    pub async fn revoke_privilege(
        &self,
        privilege: Privilege,
        database: &str,
        name: &str,
    ) -> Result<()> {
        self.pipeline
            .execute(&query::user::revoke(privilege, database, name), None)
            .await?;
        Ok(())
    }

    /// `SHOW GRANTS FOR`.
    pub async fn get_privileges(&self, name: &str) -> Result<Vec<Grant>> {
        let series = self
            .pipeline
            .execute(&query::user::show_grants(name), None)
            .await?;
        parser::parse_grants(&series)
    }
}
