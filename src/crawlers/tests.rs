use crate::Harvest;
use crate::config::ScraperConfig;
use crate::crawlers::{PageSource, ReviewScraper};
use crate::error::{Error, Result};
use crate::parsers::RawDocument;
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig as TlsServerConfig;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CARD_PAGE: &str = r#"<html><body>
<div class="styles_cardWrapper__LcCPA">
  <time datetime="2024-01-15" data-service-review-date-time-ago="true">Jan 15</time>
  <p class="typography_body-l__v5JLj typography_appearance-default__t8iAq">Great service</p>
</div>
<div class="styles_cardWrapper__LcCPA">
  <p data-service-review-text-typography="true">No date on this one</p>
</div>
</body></html>"#;

const EMPTY_PAGE: &str = "<html><body><div class='banner'>Just a moment...</div></body></html>";

fn test_config(base: &str) -> ScraperConfig {
    let mut config = ScraperConfig::new("example.com");
    config.url_template = format!("{}/review/{{company}}?page={{page}}", base);
    config.delay_min_secs = 0.0;
    config.delay_max_secs = 0.0;
    config
}

async fn mount_page(server: &MockServer, page: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/review/example.com"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// HTTPS server on 127.0.0.1 answering every request with `body`.
///
/// The leaf certificate is signed by a throwaway CA, so default clients
/// reject it. Returns the base URL and the CA certificate as PEM.
async fn start_tls_server(body: &'static str) -> (String, String) {
    let ca_key = KeyPair::generate().unwrap();
    let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params
        .distinguished_name
        .push(DnType::CommonName, "review-harvest test CA");
    let ca_cert = ca_params.self_signed(&ca_key).unwrap();

    let leaf_key = KeyPair::generate().unwrap();
    let mut leaf_params =
        CertificateParams::new(vec!["127.0.0.1".to_string(), "localhost".to_string()]).unwrap();
    leaf_params
        .distinguished_name
        .push(DnType::CommonName, "127.0.0.1");
    let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key).unwrap();

    let provider = Arc::new(tokio_rustls::rustls::crypto::ring::default_provider());
    let tls = TlsServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(
            vec![leaf_cert.der().clone()],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(leaf_key.serialize_der())),
        )
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(tls));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // verifying clients abort during the handshake
                let Ok(mut stream) = acceptor.accept(stream).await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("https://127.0.0.1:{}", port), ca_cert.pem())
}

/// In-memory page source; pages not in the map fail like a dropped connection
struct StubSource {
    pages: HashMap<u32, std::result::Result<String, u16>>,
}

impl PageSource for StubSource {
    async fn fetch_page(&self, page: u32) -> Result<RawDocument> {
        match self.pages.get(&page) {
            Some(Ok(body)) => Ok(RawDocument::new(page, body.clone())),
            Some(Err(code)) => Err(Error::Status(*code)),
            None => Err(Error::Config(format!("connection reset on page {}", page))),
        }
    }
}

#[tokio::test]
async fn test_scrape_skips_failed_and_empty_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "1", 200, CARD_PAGE).await;
    mount_page(&server, "2", 503, "unavailable").await;
    mount_page(&server, "3", 200, EMPTY_PAGE).await;

    let mut config = test_config(&server.uri());
    config.pages = 3;
    let scraper = ReviewScraper::from_config(&config).unwrap();

    let (table, report) = scraper.scrape().await;

    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.pages_ok, 2);
    assert_eq!(report.pages_bad_status, 1);
    assert_eq!(report.pages_without_containers, 1);
    assert_eq!(report.records, 2);
    assert_eq!(report.missing_dates, 1);

    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].date_slug(), "2024-01-15");
    assert_eq!(table.rows()[0].text.as_deref(), Some("Great service"));
    assert_eq!(table.rows()[1].date, None);
}

#[tokio::test]
async fn test_fixed_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("referer", "https://www.google.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CARD_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.pages = 1;
    let (records, report) = ReviewScraper::from_config(&config)
        .unwrap()
        .collect_records()
        .await;

    assert_eq!(report.pages_ok, 1);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_bypass_ssl_client_fetches_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "1", 200, CARD_PAGE).await;

    let mut config = test_config(&server.uri());
    config.pages = 1;
    config.bypass_ssl = true;
    let (table, _) = ReviewScraper::from_config(&config).unwrap().scrape().await;

    assert_eq!(table.len(), 2);
}

#[tokio::test]
async fn test_unreachable_host_is_logged_and_skipped() {
    let mut config = test_config("http://127.0.0.1:1");
    config.pages = 2;
    config.insecure_fallback = false;
    let (table, report) = ReviewScraper::from_config(&config).unwrap().scrape().await;

    assert!(table.is_empty());
    assert_eq!(report.pages_attempted, 2);
    assert_eq!(report.pages_transport_error, 2);
}

#[tokio::test]
async fn test_records_keep_page_order_across_sources() {
    let source = StubSource {
        pages: HashMap::from([
            (1, Ok(CARD_PAGE.to_string())),
            (2, Err(404)),
            (4, Ok(CARD_PAGE.replace("Great service", "Second visit"))),
        ]),
    };
    let mut config = ScraperConfig::new("example.com");
    config.pages = 4;
    config.delay_min_secs = 0.0;
    config.delay_max_secs = 0.0;
    let scraper = ReviewScraper::with_source(source, &config).unwrap();

    let (records, report) = scraper.collect_records().await;

    assert_eq!(report.pages_bad_status, 1);
    assert_eq!(report.pages_transport_error, 1);
    let texts: Vec<_> = records.iter().filter_map(|r| r.text.as_deref()).collect();
    assert_eq!(
        texts,
        vec![
            "Great service",
            "No date on this one",
            "Second visit",
            "No date on this one"
        ]
    );
}

#[tokio::test]
async fn test_debug_mode_saves_pages() {
    let dir = tempfile::tempdir().unwrap();
    let source = StubSource {
        pages: HashMap::from([(1, Ok(EMPTY_PAGE.to_string()))]),
    };
    let mut config = ScraperConfig::new("example.com");
    config.pages = 1;
    config.delay_min_secs = 0.0;
    config.delay_max_secs = 0.0;
    config.debug = true;
    config.debug_dir = dir.path().to_path_buf();

    let (table, report) = ReviewScraper::with_source(source, &config)
        .unwrap()
        .scrape()
        .await;

    assert!(table.is_empty());
    assert_eq!(report.pages_without_containers, 1);
    let saved = std::fs::read_to_string(dir.path().join("trustpilot_page_1.html")).unwrap();
    assert_eq!(saved, EMPTY_PAGE);
}

#[tokio::test]
async fn test_untrusted_certificate_retried_without_verification() {
    let (base, _) = start_tls_server(CARD_PAGE).await;
    let mut config = test_config(&base);
    config.pages = 1;
    assert!(config.insecure_fallback);

    let (table, report) = ReviewScraper::from_config(&config).unwrap().scrape().await;

    assert_eq!(report.pages_ok, 1);
    assert_eq!(report.pages_transport_error, 0);
    assert_eq!(table.len(), 2);
}

#[tokio::test]
async fn test_untrusted_certificate_fails_without_fallback() {
    let (base, _) = start_tls_server(CARD_PAGE).await;
    let mut config = test_config(&base);
    config.pages = 1;
    config.insecure_fallback = false;

    let (table, report) = ReviewScraper::from_config(&config).unwrap().scrape().await;

    assert!(table.is_empty());
    assert_eq!(report.pages_ok, 0);
    assert_eq!(report.pages_transport_error, 1);
}

#[tokio::test]
async fn test_ca_bundle_makes_certificate_trusted() {
    let dir = tempfile::tempdir().unwrap();
    let (base, ca_pem) = start_tls_server(CARD_PAGE).await;
    let bundle = dir.path().join("ca.pem");
    std::fs::write(&bundle, ca_pem).unwrap();

    let mut config = test_config(&base);
    config.pages = 1;
    config.insecure_fallback = false;
    config.ca_bundle = Some(bundle);

    let (table, report) = ReviewScraper::from_config(&config).unwrap().scrape().await;

    assert_eq!(report.pages_ok, 1);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_invalid_ca_bundle_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("ca.pem");
    std::fs::write(&bundle, "not a certificate").unwrap();

    let mut config = test_config("https://127.0.0.1:1");
    config.ca_bundle = Some(bundle);
    assert!(matches!(ReviewScraper::from_config(&config), Err(Error::Http(_))));

    config.ca_bundle = Some(dir.path().join("missing.pem"));
    assert!(matches!(ReviewScraper::from_config(&config), Err(Error::Io(_))));
}

#[test]
fn test_oversized_delay_is_rejected_before_scraping() {
    let mut config = test_config("http://127.0.0.1:1");
    config.delay_max_secs = 1e30;
    assert!(matches!(ReviewScraper::from_config(&config), Err(Error::Config(_))));
}

#[tokio::test]
async fn test_harvest_runs_with_prepared_config() {
    let server = MockServer::start().await;
    mount_page(&server, "1", 200, CARD_PAGE).await;
    mount_page(&server, "2", 200, EMPTY_PAGE).await;

    let mut config = test_config(&server.uri());
    config.pages = 5;
    let harvest = Harvest::with_config(config).with_pages(2);
    assert_eq!(harvest.config().company, "example.com");

    let (table, report) = harvest.run().await.unwrap();

    assert_eq!(report.pages_attempted, 2);
    assert_eq!(report.pages_without_containers, 1);
    assert_eq!(table.len(), 2);
}
