use globalprice::cli::list::ListOptions;
use globalprice::core::catalog::load_catalog;
use globalprice::core::config::AppConfig;
use globalprice::core::sort::SortKey;
use globalprice::providers::{FileSource, HttpSource};
use globalprice::{AppCommand, execute};
use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const MAIN_INDEX: &str = r#"{"categories": ["iPhone", "Mac"], "lastUpdated": "2025-09-20T00:00:00.000Z", "categoryCount": 2}"#;
    pub const IPHONE_INDEX: &str =
        r#"{"category": "iPhone", "files": ["jp.json", "us.json"], "fileCount": 2}"#;
    pub const MAC_INDEX: &str = r#"{"category": "Mac", "files": ["us.json"], "fileCount": 1}"#;
    pub const IPHONE_JP: &str = r#"[
        {"model": "iPhone 16", "storage": "128GB", "country_code": "JP", "currency": "JPY",
         "net_price": 113455, "tax_fees": 11345, "retail_price": 124800},
        {"model": "iPhone 16", "storage": "256GB", "country_code": "JP", "currency": "JPY",
         "retail_price": 139800}
    ]"#;
    pub const IPHONE_US: &str = r#"[
        {"model": "iPhone 16", "storage": "128GB", "country_code": "US", "currency": "USD",
         "retail_price": 799},
        {"model": "iPhone 16", "storage": "256GB", "country_code": "US", "currency": "USD",
         "retail_price": 899}
    ]"#;
    pub const MAC_US: &str = r#"[
        {"model": "MacBook Air", "storage": "256GB", "country_code": "US", "currency": "USD",
         "retail_price": 999, "chip": "M4"}
    ]"#;
    pub const COUNTRIES: &str = r#"[
        {"code": "JP", "name_en": "Japan", "name_zh": "日本", "name_local": "日本",
         "tax_info": {"can_refund": true, "refund_rate": "10%", "notes": "Tax-free shops"}},
        {"code": "US", "name_en": "United States", "name_zh": "美国",
         "tax_info": {"can_refund": false, "refund_rate": "N/A"}}
    ]"#;
    pub const RATES: &str = r#"[
        {"base_currency": "USD", "rates": {"JPY": 150.0, "CNY": 7.1, "EUR": 0.9}, "date": "2025-09-20"}
    ]"#;

    pub const DATASET: [(&str, &str); 7] = [
        ("data/prices/index.json", MAIN_INDEX),
        ("data/prices/iPhone/index.json", IPHONE_INDEX),
        ("data/prices/iPhone/jp.json", IPHONE_JP),
        ("data/prices/iPhone/us.json", IPHONE_US),
        ("data/prices/Mac/index.json", MAC_INDEX),
        ("data/prices/Mac/us.json", MAC_US),
        ("data/country_info/cr.json", COUNTRIES),
    ];
    pub const RATES_PATH: &str = "data/exchange_rates/latest.json";

    pub async fn create_mock_server(documents: &[(&str, &str)]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (doc_path, body) in documents {
            Mock::given(method("GET"))
                .and(path(format!("/{doc_path}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(*body))
                .mount(&mock_server)
                .await;
        }
        mock_server
    }

    pub async fn create_full_mock_server() -> MockServer {
        let mut documents = DATASET.to_vec();
        documents.push((RATES_PATH, RATES));
        create_mock_server(&documents).await
    }
}

fn plain(output: &str) -> String {
    console::strip_ansi_codes(output).to_string()
}

fn write_dataset(root: &Path) {
    let mut documents = test_utils::DATASET.to_vec();
    documents.push((test_utils::RATES_PATH, test_utils::RATES));
    for (doc_path, body) in documents {
        let full_path = root.join(doc_path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(full_path, body).unwrap();
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_full_mock_server().await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        source:
          base_url: {}
        currency:
          from: "USD"
          to: "CNY"
    "#,
        mock_server.uri()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");

    let options = ListOptions {
        line: Some("iPhone".to_string()),
        ..Default::default()
    };
    let result = globalprice::run_command(
        AppCommand::List(options),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_list_converts_and_sorts() {
    let mock_server = test_utils::create_full_mock_server().await;
    let source = HttpSource::new(&mock_server.uri()).unwrap();
    let config = AppConfig::default();

    let options = ListOptions {
        line: Some("iPhone".to_string()),
        sort: Some(SortKey::Price),
        descending: true,
        to_currency: Some("USD".to_string()),
        ..Default::default()
    };
    let output = plain(&execute(AppCommand::List(options), &config, &source).await.unwrap());
    info!("{output}");

    assert!(output.contains("Found 4 products from 2 countries."));
    // 139800 JPY = 932 USD, most expensive
    let jp_256 = output.find("932.00").unwrap();
    let us_256 = output.find("899.00").unwrap();
    let us_128 = output.find("799.00").unwrap();
    assert!(jp_256 < us_256 && us_256 < us_128);
    assert!(!output.contains("MacBook"));
}

#[test_log::test(tokio::test)]
async fn test_list_with_field_filter() {
    let mock_server = test_utils::create_full_mock_server().await;
    let source = HttpSource::new(&mock_server.uri()).unwrap();
    let config = AppConfig::default();

    let options = ListOptions {
        countries: vec!["us".to_string()],
        filters: vec![("storage".to_string(), "256GB".into())],
        ..Default::default()
    };
    let output = plain(&execute(AppCommand::List(options), &config, &source).await.unwrap());
    assert!(output.contains("Found 2 products from 1 countries."));
    assert!(output.contains("MacBook"));
}

#[test_log::test(tokio::test)]
async fn test_missing_rates_still_lists_products() {
    let mock_server = test_utils::create_mock_server(&test_utils::DATASET).await;
    let source = HttpSource::new(&mock_server.uri()).unwrap();

    let catalog = load_catalog(&source, "USD").await;
    assert_eq!(catalog.products.as_ref().unwrap().len(), 5);
    let err = catalog.rates.as_ref().unwrap_err();
    assert!(format!("{err:#}").contains("HTTP error: 404 Not Found"));

    let output = plain(
        &execute(
            AppCommand::List(ListOptions::default()),
            &AppConfig::default(),
            &source,
        )
        .await
        .unwrap(),
    );
    assert!(output.contains("Found 5 products from 2 countries."));
    assert!(output.contains("N/A"));

    let rate = execute(
        AppCommand::Rate {
            from: None,
            to: None,
            amount: 1.0,
        },
        &AppConfig::default(),
        &source,
    )
    .await;
    assert!(rate.is_err());
}

#[test_log::test(tokio::test)]
async fn test_missing_products_is_reported() {
    let mock_server =
        test_utils::create_mock_server(&[(test_utils::RATES_PATH, test_utils::RATES)]).await;
    let source = HttpSource::new(&mock_server.uri()).unwrap();
    let config = AppConfig::default();

    let err = execute(AppCommand::List(ListOptions::default()), &config, &source)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Product data unavailable"));

    let lines = plain(&execute(AppCommand::Lines, &config, &source).await.unwrap());
    assert!(lines.contains("iPhone"));
    assert!(lines.contains("iPad"));
    assert!(lines.contains("Mac"));

    let rate = plain(
        &execute(
            AppCommand::Rate {
                from: Some("EUR".to_string()),
                to: None,
                amount: 100.0,
            },
            &config,
            &source,
        )
        .await
        .unwrap(),
    );
    assert!(rate.contains("1 EUR = 7.888889 CNY"));
}

#[test_log::test(tokio::test)]
async fn test_local_data_path() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let source = FileSource::new(temp_dir.path());
    let config = AppConfig::default();

    let fields = plain(
        &execute(
            AppCommand::Fields {
                line: Some("Mac".to_string()),
            },
            &config,
            &source,
        )
        .await
        .unwrap(),
    );
    assert!(fields.contains("chip"));
    assert!(fields.contains("M4"));

    let currencies = plain(&execute(AppCommand::Currencies, &config, &source).await.unwrap());
    assert!(currencies.contains("4 currencies"));

    let lines = plain(&execute(AppCommand::Lines, &config, &source).await.unwrap());
    assert!(lines.contains("iPhone (4 listings)"));
    assert!(lines.contains("Mac (1 listings)"));

    let config_file = temp_dir.path().join("config.yaml");
    fs::write(
        &config_file,
        format!("source:\n  data_path: \"{}\"\n", temp_dir.path().display()),
    )
    .unwrap();
    let result = globalprice::run_command(AppCommand::Lines, config_file.to_str()).await;
    assert!(result.is_ok(), "Lines failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_index_then_load() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let prices = temp_dir.path().join("data/prices");
    fs::remove_file(prices.join("index.json")).unwrap();
    fs::write(prices.join("Mac/broken.json"), "{").unwrap();

    let summary = globalprice::core::index::generate_index_files(&prices).unwrap();
    assert_eq!(summary.categories, vec!["Mac", "iPhone"]);
    assert_eq!(summary.invalid_files, 1);

    let source = FileSource::new(temp_dir.path());
    let catalog = load_catalog(&source, "USD").await;
    assert_eq!(catalog.products.as_ref().unwrap().len(), 5);
    assert_eq!(catalog.product_lines(), vec!["Mac", "iPhone"]);
}
