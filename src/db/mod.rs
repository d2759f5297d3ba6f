//! MongoDB 연결
//!
//! 드라이버의 `Client`는 내부에 커넥션 풀을 가지고 있어 복제해도 같은 풀을 공유합니다.
//! 세션과 커넥션은 작업 단위로 빌려 쓰고 스코프를 벗어나면 반환됩니다.

use log::info;
use mongodb::{options::ClientOptions, Client};

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// 환경 변수(`MONGODB_URI`, `DATABASE_NAME`)로 연결하고 ping으로 확인합니다.
    pub async fn new() -> Result<Self, mongodb::error::Error> {
        Self::connect(&DatabaseConfig::uri(), DatabaseConfig::database_name()).await
    }

    pub async fn connect(uri: &str, database_name: String) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some("user_account_service".to_string());

        let client = Client::with_options(client_options)?;

        client
            .database(&database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("✅ MongoDB 연결 성공: {}", database_name);

        Ok(Self {
            client,
            database_name,
        })
    }

    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}
