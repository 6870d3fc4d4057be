//! `expd open <path>`: resolve a back-office path the way the browser
//! router would and print the decision.

use anyhow::Result;
use clap::Args;
use expd_session::Navigation;

use crate::context::AppContext;
use crate::EXIT_SIGN_IN;

/// Arguments for `expd open`.
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Path to open, e.g. `/dashboard/vehicles/12`.
    pub path: String,
}

/// Execute `expd open`.
pub async fn run_open(ctx: &AppContext, args: &OpenArgs) -> Result<u8> {
    match ctx.routes.navigate(&ctx.session, &args.path).await {
        Navigation::Render(route) => {
            print!("render {}", route.name);
            for (key, value) in &route.params {
                print!(" {key}={value}");
            }
            println!();
            Ok(0)
        }
        Navigation::Redirect(to) => {
            println!("redirect {to}");
            Ok(EXIT_SIGN_IN)
        }
        Navigation::Loading(text) => {
            println!("loading {text}");
            Ok(EXIT_SIGN_IN)
        }
        Navigation::Nothing => {
            println!("nothing");
            Ok(EXIT_SIGN_IN)
        }
        Navigation::NotFound => {
            println!("not found {}", args.path);
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use expd_client::{ApiConfig, ExpdClient, MemoryTokenStore};
    use wiremock::MockServer;

    #[tokio::test]
    async fn signed_out_dashboard_redirects() {
        let mock_server = MockServer::start().await;
        let config = ApiConfig::local_mock(&mock_server.uri()).unwrap();
        let client = ExpdClient::new(config, Arc::new(MemoryTokenStore::new())).unwrap();
        let ctx = AppContext::new(client);

        let args = OpenArgs {
            path: "/dashboard/payments".into(),
        };
        assert_eq!(run_open(&ctx, &args).await.unwrap(), EXIT_SIGN_IN);

        let public = OpenArgs {
            path: "/auth/sign-in".into(),
        };
        assert_eq!(run_open(&ctx, &public).await.unwrap(), 0);

        let missing = OpenArgs {
            path: "/nowhere".into(),
        };
        assert_eq!(run_open(&ctx, &missing).await.unwrap(), 1);
    }
}
