use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 預設過濾規則，涵蓋函式庫與 `yard` 執行檔
pub fn cli_default_directives(verbose: bool) -> &'static str {
    if verbose {
        "yard_checkin=debug,yard=debug,info"
    } else {
        "yard_checkin=info,yard=info"
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli_default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_lambda_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("yard_checkin=info,sweep_lambda=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .without_time()
                .json(), // CloudWatch 以 JSON 解析
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_filter_covers_binary_target() {
        for verbose in [false, true] {
            let directives = cli_default_directives(verbose);
            assert!(directives.split(',').any(|d| d.starts_with("yard=")), "{}", directives);
            assert!(directives.split(',').any(|d| d.starts_with("yard_checkin=")));
            assert!(directives.parse::<EnvFilter>().is_ok());
        }
        assert!(cli_default_directives(false).contains("yard=info"));
    }
}
