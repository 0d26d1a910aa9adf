use sea_orm_migration::prelude::*;

use shofy_auth_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
