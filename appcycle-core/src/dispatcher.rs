//! Lifecycle dispatcher.
//!
//! One call to [`Dispatcher::dispatch`] runs a request through
//! decode → verify → route → encode and either returns the response body or a
//! single [`AppError`]. The dispatcher keeps no state between calls apart from
//! the shared key cache.

use std::sync::Arc;

use appcycle_sdk::config::{AppDefinition, DispatcherConfig};
use appcycle_sdk::context::RequestContext;
use appcycle_sdk::marshal::Marshaler;
use appcycle_sdk::objects::{
    ConfigPhase, ConfigurationRequest, ConfirmationRequest, ConfirmationResponse, EventResponse,
    InstallResponse, LifecycleRequest, LifecycleResponse, OauthCallbackResponse,
    UninstallResponse, UpdateResponse,
};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::handler::LifecycleHandler;
use crate::keys::KeyCache;
use crate::pages::{ConfigManager, PageError, StaticConfigManager, parse_page_id};
use crate::verifier::SignatureVerifier;

pub struct Dispatcher {
    definition: AppDefinition,
    handler: Arc<dyn LifecycleHandler>,
    config: DispatcherConfig,
    manager: Arc<dyn ConfigManager>,
    marshaler: Marshaler,
    verifier: SignatureVerifier,
}

impl Dispatcher {
    /// A dispatcher using the static page manager and a key cache backed by
    /// the configured key server.
    pub fn new(
        definition: AppDefinition,
        handler: Arc<dyn LifecycleHandler>,
        config: DispatcherConfig,
    ) -> Self {
        let keys = Arc::new(KeyCache::from_config(&config));
        Self {
            definition,
            handler,
            config,
            manager: Arc::new(StaticConfigManager),
            marshaler: Marshaler::json(),
            verifier: SignatureVerifier::new(keys),
        }
    }

    pub fn with_config_manager(mut self, manager: Arc<dyn ConfigManager>) -> Self {
        self.manager = manager;
        self
    }

    /// Share a key cache, e.g. across reloads.
    pub fn with_key_cache(mut self, keys: Arc<KeyCache>) -> Self {
        self.verifier = SignatureVerifier::new(keys);
        self
    }

    pub fn definition(&self) -> &AppDefinition {
        &self.definition
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn key_cache(&self) -> &Arc<KeyCache> {
        self.verifier.keys()
    }

    /// Handle one request and return the JSON response body.
    ///
    /// Every error carries the request's correlation id when it has one.
    pub async fn dispatch(&self, context: &RequestContext) -> Result<String, AppError> {
        let correlation_id = context.correlation_id();

        if self.config.log_raw_body {
            debug!(correlation_id = ?correlation_id, body = %context.body(), "Raw request body");
        }

        let request: LifecycleRequest = self
            .marshaler
            .decode(context.body())
            .map_err(|e| AppError::bad_request(e.to_string(), correlation_id))?;

        info!(correlation_id = ?correlation_id, phase = %request.phase(), "Handling lifecycle request");
        debug!(correlation_id = ?correlation_id, date = ?context.date(), "Request date");
        debug!(correlation_id = ?correlation_id, signature = ?context.signature(), "Request signature");
        if let Ok(rendered) = self.marshaler.diagnostic(&request) {
            debug!(correlation_id = ?correlation_id, request = %rendered, "Decoded request");
        }

        if self.config.check_signatures {
            self.verifier
                .verify(context, &self.config, &self.definition)
                .await
                .map_err(|e| {
                    warn!(correlation_id = ?correlation_id, error = %e, "Signature verification failed");
                    AppError::signature(e.to_string(), correlation_id)
                })?;
        }

        let response = self.route(correlation_id, &request).await?;
        self.marshaler
            .encode(&response)
            .map_err(|e| AppError::internal(e.to_string(), correlation_id))
    }

    async fn route(
        &self,
        correlation_id: Option<&str>,
        request: &LifecycleRequest,
    ) -> Result<LifecycleResponse, AppError> {
        let handler_failed = |e: anyhow::Error| {
            warn!(correlation_id = ?correlation_id, error = %e, "Lifecycle handler failed");
            AppError::internal(e.to_string(), correlation_id)
        };

        match request {
            LifecycleRequest::Confirmation(request) => {
                self.handler
                    .handle_confirmation(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                Ok(self.confirm(request))
            }
            LifecycleRequest::Configuration(request) => {
                self.handler
                    .handle_configuration(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                self.configure(request)
                    .await
                    .map_err(|e| page_error(e, correlation_id))
            }
            LifecycleRequest::Install(request) => {
                self.handler
                    .handle_install(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                Ok(LifecycleResponse::Install(InstallResponse::default()))
            }
            LifecycleRequest::Update(request) => {
                self.handler
                    .handle_update(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                Ok(LifecycleResponse::Update(UpdateResponse::default()))
            }
            LifecycleRequest::Uninstall(request) => {
                self.handler
                    .handle_uninstall(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                Ok(LifecycleResponse::Uninstall(UninstallResponse::default()))
            }
            LifecycleRequest::OauthCallback(request) => {
                self.handler
                    .handle_oauth_callback(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                Ok(LifecycleResponse::OauthCallback(
                    OauthCallbackResponse::default(),
                ))
            }
            LifecycleRequest::Event(request) => {
                self.handler
                    .handle_event(correlation_id, request)
                    .await
                    .map_err(handler_failed)?;
                Ok(LifecycleResponse::Event(EventResponse::default()))
            }
        }
    }

    fn confirm(&self, request: &ConfirmationRequest) -> LifecycleResponse {
        info!(
            app_id = %request.app_id,
            confirmation_url = %request.confirmation_data.confirmation_url,
            "CONFIRMATION"
        );
        LifecycleResponse::Confirmation(ConfirmationResponse {
            target_url: self.definition.target_url.clone(),
        })
    }

    async fn configure(
        &self,
        request: &ConfigurationRequest,
    ) -> Result<LifecycleResponse, PageError> {
        match request.configuration_data.phase {
            ConfigPhase::Initialize => self
                .manager
                .handle_initialize(request, &self.definition)
                .await
                .map(LifecycleResponse::ConfigurationInit),
            ConfigPhase::Page => {
                let page_id = parse_page_id(&request.configuration_data.page_id)?;
                self.manager
                    .handle_page(request, &self.definition, page_id)
                    .await
                    .map(LifecycleResponse::ConfigurationPage)
            }
        }
    }
}

fn page_error(e: PageError, correlation_id: Option<&str>) -> AppError {
    match e {
        PageError::Internal(e) => AppError::internal(e.to_string(), correlation_id),
        other => AppError::bad_request(other.to_string(), correlation_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{
        CountingFetcher, DEFAULT_AUTHORIZATION, LIFECYCLE_BODY, LIFECYCLE_SIGNING_KEY,
        PUBLIC_SIGNING_KEY, RecordingHandler, lifecycle_headers, signed_headers,
    };
    use appcycle_sdk::config::AppConfigPage;
    use appcycle_sdk::objects::{
        ConfigSection, ConfigSetting, ConfigSettingType, LifecyclePhase, PlainSetting,
        SettingHeader,
    };
    use rstest::rstest;
    use serde_json::{Value, json};

    fn page(name: &str) -> AppConfigPage {
        AppConfigPage {
            page_name: name.into(),
            sections: vec![ConfigSection {
                name: format!("{name} section"),
                settings: vec![ConfigSetting::Time(PlainSetting {
                    header: SettingHeader::new("when", "When", "Pick a time"),
                    setting_type: ConfigSettingType::Time,
                })],
            }],
        }
    }

    fn definition(pages: usize) -> AppDefinition {
        AppDefinition {
            id: "app-id".into(),
            name: "Porch Lights".into(),
            description: "Turns the porch lights on".into(),
            target_url: "https://example.com/foo?param=value&pet=dog".into(),
            permissions: vec!["r:devices:*".into()],
            config_pages: (1..=pages).map(|n| page(&format!("Page {n}"))).collect(),
        }
    }

    fn unchecked() -> DispatcherConfig {
        DispatcherConfig {
            check_signatures: false,
            ..DispatcherConfig::default()
        }
    }

    struct Fixture {
        dispatcher: Dispatcher,
        handler: Arc<RecordingHandler>,
        fetcher: Arc<CountingFetcher>,
    }

    fn fixture(pages: usize, config: DispatcherConfig, handler: RecordingHandler) -> Fixture {
        fixture_with_key(pages, config, handler, PUBLIC_SIGNING_KEY)
    }

    fn fixture_with_key(
        pages: usize,
        config: DispatcherConfig,
        handler: RecordingHandler,
        pem: &str,
    ) -> Fixture {
        let handler = Arc::new(handler);
        let fetcher = Arc::new(CountingFetcher::new(pem));
        let dispatcher = Dispatcher::new(definition(pages), handler.clone(), config)
            .with_key_cache(Arc::new(KeyCache::new(fetcher.clone())));
        Fixture {
            dispatcher,
            handler,
            fetcher,
        }
    }

    fn installed_app() -> Value {
        json!({"installedAppId": "installed", "locationId": "location", "config": {}})
    }

    fn body(phase: &str, extra: Value) -> String {
        let mut request = json!({
            "lifecycle": phase,
            "executionId": "exec",
            "locale": "en",
            "version": "0.1.0"
        });
        if let (Value::Object(request), Value::Object(extra)) = (&mut request, extra) {
            request.extend(extra);
        }
        request.to_string()
    }

    fn configuration(phase: &str, page_id: &str) -> String {
        body(
            "CONFIGURATION",
            json!({"configurationData": {
                "installedAppId": "installed",
                "phase": phase,
                "pageId": page_id,
                "previousPageId": "",
                "config": {}
            }}),
        )
    }

    fn context(body: String) -> RequestContext {
        RequestContext::new([("x-st-correlation", "abc123")], body)
    }

    async fn dispatch_json(dispatcher: &Dispatcher, body: String) -> Value {
        let response = dispatcher.dispatch(&context(body)).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[tokio::test]
    async fn install_calls_handler_once_and_acknowledges() {
        let f = fixture(1, unchecked(), RecordingHandler::default());
        let request = body(
            "INSTALL",
            json!({"installData": {"authToken": "a", "refreshToken": "r", "installedApp": installed_app()}}),
        );
        let response = dispatch_json(&f.dispatcher, request).await;
        assert_eq!(response, json!({"installData": {}}));
        assert_eq!(
            f.handler.calls(),
            vec![(LifecyclePhase::Install, Some("abc123".to_string()))]
        );
    }

    #[rstest]
    #[case("UPDATE", json!({"updateData": {"authToken": "a", "refreshToken": "r", "installedApp": installed_app()}}), "updateData", LifecyclePhase::Update)]
    #[case("UNINSTALL", json!({"uninstallData": {"installedApp": installed_app()}}), "uninstallData", LifecyclePhase::Uninstall)]
    #[case("OAUTH_CALLBACK", json!({"oAuthCallbackData": {"installedAppId": "i", "urlPath": "/cb"}}), "oAuthCallbackData", LifecyclePhase::OauthCallback)]
    #[case("EVENT", json!({"eventData": {"authToken": "a", "installedApp": installed_app(), "events": []}}), "eventData", LifecyclePhase::Event)]
    #[tokio::test]
    async fn other_phases_acknowledge(
        #[case] phase: &str,
        #[case] payload: Value,
        #[case] key: &str,
        #[case] expected: LifecyclePhase,
    ) {
        let f = fixture(1, unchecked(), RecordingHandler::default());
        let response = dispatch_json(&f.dispatcher, body(phase, payload)).await;
        assert_eq!(response, json!({ key: {} }));
        assert_eq!(f.handler.calls().len(), 1);
        assert_eq!(f.handler.calls()[0].0, expected);
    }

    #[tokio::test]
    async fn confirmation_returns_target_url() {
        let f = fixture(1, unchecked(), RecordingHandler::default());
        let request = body(
            "CONFIRMATION",
            json!({
                "appId": "app-id",
                "confirmationData": {"appId": "app-id", "confirmationUrl": "https://example.com/confirm"}
            }),
        );
        let response = dispatch_json(&f.dispatcher, request).await;
        assert_eq!(
            response,
            json!({"targetUrl": "https://example.com/foo?param=value&pet=dog"})
        );
        assert_eq!(f.handler.calls()[0].0, LifecyclePhase::Confirmation);
    }

    #[tokio::test]
    async fn initialize_names_first_page() {
        let f = fixture(2, unchecked(), RecordingHandler::default());
        let response = dispatch_json(&f.dispatcher, configuration("INITIALIZE", "")).await;
        assert_eq!(
            response,
            json!({"configurationData": {"initialize": {
                "id": "app-id",
                "name": "Porch Lights",
                "description": "Turns the porch lights on",
                "permissions": ["r:devices:*"],
                "firstPageId": "1"
            }}})
        );
        assert_eq!(f.handler.calls()[0].0, LifecyclePhase::Configuration);
    }

    #[rstest]
    #[case("1", Value::Null, json!("2"), false)]
    #[case("2", json!("1"), json!("3"), false)]
    #[case("3", json!("2"), Value::Null, true)]
    #[tokio::test]
    async fn pages_are_linked(
        #[case] page_id: &str,
        #[case] previous: Value,
        #[case] next: Value,
        #[case] complete: bool,
    ) {
        let f = fixture(3, unchecked(), RecordingHandler::default());
        let response = dispatch_json(&f.dispatcher, configuration("PAGE", page_id)).await;
        let page = &response["configurationData"]["page"];
        assert_eq!(page["pageId"], page_id);
        assert_eq!(page["name"], format!("Page {page_id}"));
        assert_eq!(page["previousPageId"], previous);
        assert_eq!(page["nextPageId"], next);
        assert_eq!(page["complete"], complete);
        assert_eq!(page["sections"][0]["settings"][0]["type"], "TIME");
    }

    #[rstest]
    #[case("4", "Page not found: 4")]
    #[case("0", "Page not found: 0")]
    #[case("abc", "Invalid page id")]
    #[tokio::test]
    async fn bad_pages_are_bad_requests(#[case] page_id: &str, #[case] message: &str) {
        let f = fixture(3, unchecked(), RecordingHandler::default());
        let err = f
            .dispatcher
            .dispatch(&context(configuration("PAGE", page_id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert!(err.message.contains(message), "{}", err.message);
        assert_eq!(err.correlation_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn page_without_pages_is_a_bad_request() {
        let f = fixture(0, unchecked(), RecordingHandler::default());
        let err = f
            .dispatcher
            .dispatch(&context(configuration("PAGE", "1")))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }

    #[rstest]
    #[case("{oops")]
    #[case(r#"{"lifecycle": "REBOOT", "executionId": "e", "locale": "en", "version": "1"}"#)]
    #[case(r#"{"lifecycle": "INSTALL", "executionId": "e", "locale": "en", "version": "1"}"#)]
    #[tokio::test]
    async fn undecodable_requests_are_bad_requests(#[case] raw: &str) {
        let f = fixture(1, unchecked(), RecordingHandler::default());
        let err = f
            .dispatcher
            .dispatch(&context(raw.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.correlation_id.as_deref(), Some("abc123"));
        assert!(f.handler.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_phase_message_names_the_kind() {
        let f = fixture(1, unchecked(), RecordingHandler::default());
        let err = f
            .dispatcher
            .dispatch(&context(body("REBOOT", json!({}))))
            .await
            .unwrap_err();
        assert!(err.message.contains("unknown lifecycle phase: REBOOT"));
    }

    #[tokio::test]
    async fn handler_failures_are_internal() {
        let f = fixture(1, unchecked(), RecordingHandler::failing());
        let request = body("UNINSTALL", json!({"uninstallData": {"installedApp": installed_app()}}));
        let err = f.dispatcher.dispatch(&context(request)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.correlation_id.as_deref(), Some("abc123"));
        assert!(err.message.contains("handler failed"));
    }

    #[tokio::test]
    async fn unsigned_request_fails_when_checking() {
        let f = fixture(1, DispatcherConfig::default(), RecordingHandler::default());
        let request = body("UNINSTALL", json!({"uninstallData": {"installedApp": installed_app()}}));
        let err = f.dispatcher.dispatch(&context(request)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);
        assert_eq!(err.correlation_id.as_deref(), Some("abc123"));
        assert!(f.handler.calls().is_empty());
    }

    #[tokio::test]
    async fn disabling_checks_skips_verification_entirely() {
        // Signed for a different body, and dated 2014: fails whenever verified.
        let request = body("UNINSTALL", json!({"uninstallData": {"installedApp": installed_app()}}));
        let mut headers = signed_headers();
        headers.push(("Authorization", DEFAULT_AUTHORIZATION));
        headers.push(("X-ST-Correlation", "abc123"));
        let signed = RequestContext::new(headers, request);

        let checked = fixture(1, DispatcherConfig::default(), RecordingHandler::default());
        let err = checked.dispatcher.dispatch(&signed).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);

        let skipped = fixture(1, unchecked(), RecordingHandler::default());
        let response = skipped.dispatcher.dispatch(&signed).await.unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&response).unwrap(),
            json!({"uninstallData": {}})
        );
        assert_eq!(skipped.fetcher.calls(), 0);
    }

    fn unbounded() -> DispatcherConfig {
        DispatcherConfig {
            clock_skew_secs: None,
            ..DispatcherConfig::default()
        }
    }

    #[tokio::test]
    async fn verified_request_is_dispatched() {
        let f = fixture_with_key(
            1,
            unbounded(),
            RecordingHandler::default(),
            LIFECYCLE_SIGNING_KEY,
        );
        let response = f
            .dispatcher
            .dispatch(&RequestContext::new(lifecycle_headers(), LIFECYCLE_BODY))
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&response).unwrap(),
            json!({"uninstallData": {}})
        );
        assert_eq!(f.fetcher.calls(), 1);
        assert_eq!(
            f.handler.calls(),
            vec![(LifecyclePhase::Uninstall, Some("abc123".to_string()))]
        );
    }

    #[rstest]
    #[case(LIFECYCLE_BODY.replace("location", "elsewhere"))]
    #[case(LIFECYCLE_BODY.replace("\"config\":{}", "\"config\":{},\"extra\":1"))]
    #[tokio::test]
    async fn tampered_signed_body_is_rejected(#[case] body: String) {
        let f = fixture_with_key(
            1,
            unbounded(),
            RecordingHandler::default(),
            LIFECYCLE_SIGNING_KEY,
        );
        let err = f
            .dispatcher
            .dispatch(&RequestContext::new(lifecycle_headers(), body))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);
        assert_eq!(err.correlation_id.as_deref(), Some("abc123"));
        assert!(f.handler.calls().is_empty());
    }

    #[tokio::test]
    async fn date_only_signature_is_rejected() {
        let request = body("UNINSTALL", json!({"uninstallData": {"installedApp": installed_app()}}));
        let mut headers = signed_headers();
        headers.push(("Authorization", DEFAULT_AUTHORIZATION));
        let f = fixture(1, unbounded(), RecordingHandler::default());
        let err = f
            .dispatcher
            .dispatch(&RequestContext::new(headers, request))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);
        assert!(err.message.contains("digest"), "{}", err.message);
        assert_eq!(f.fetcher.calls(), 0);
    }
}
