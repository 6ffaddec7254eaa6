//! BFF dispatcher: forwards `/api/...` calls to internal services

use crate::config::{EdgeConfig, ProxyConfig};
use crate::error::Result;
use crate::http::utils::{body_from, path_and_query, BoxError, ClientAddr, Resp};
use crate::http::CookieJar;
use crate::proxy::headers::{outbound_request_headers, page_request_headers, relayed_response_headers};
use crate::proxy::token::derive_bearer;
use crate::proxy::{ProxyError, ProxyRouteTable, ServiceKind, ServiceRegistry};
use bytes::Bytes;
use http_body::Body;
use http_body_util::BodyExt;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use hyper::{Method, Request, Response};
use std::time::Duration;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Shared upstream client with explicit timeouts
pub fn build_client(config: &ProxyConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

/// Failure text with its source chain, e.g. `error sending request: connection refused`
fn error_detail(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    if err.is_timeout() && !detail.contains("timed out") {
        detail.push_str(" (timed out)");
    }
    detail
}

/// Add `X-Forwarded-For`, `X-Forwarded-Proto` and `X-Request-Id`
fn add_forwarding_headers<B>(req: &Request<B>, headers: &mut HeaderMap) {
    if let Some(ClientAddr(addr)) = req.extensions().get::<ClientAddr>() {
        let peer = addr.ip().to_string();
        let chain = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.trim().is_empty() => format!("{}, {}", existing, peer),
            _ => peer,
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }
    if !headers.contains_key(&X_REQUEST_ID) {
        if let Ok(value) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
            headers.insert(X_REQUEST_ID, value);
        }
    }
}

fn has_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Turn the request body into a streamed reqwest body
fn outbound_body<B>(body: B) -> reqwest::Body
where
    B: Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<BoxError>,
{
    reqwest::Body::wrap_stream(body.into_data_stream())
}

pub struct ProxyDispatcher {
    client: reqwest::Client,
    registry: ServiceRegistry,
    routes: ProxyRouteTable,
    token_cookies: Vec<String>,
    expose_diagnostics: bool,
}

impl ProxyDispatcher {
    pub fn new(
        client: reqwest::Client,
        registry: ServiceRegistry,
        routes: ProxyRouteTable,
        token_cookies: Vec<String>,
    ) -> Self {
        Self { client, registry, routes, token_cookies, expose_diagnostics: true }
    }

    pub fn from_config(config: &EdgeConfig) -> Result<Self> {
        Ok(Self::new(
            build_client(&config.proxy)?,
            ServiceRegistry::from_config(&config.services),
            ProxyRouteTable::from_config(&config.proxy),
            config.identity.token_cookies.clone(),
        )
        .with_expose_diagnostics(config.proxy.expose_diagnostics))
    }

    pub fn with_expose_diagnostics(mut self, expose: bool) -> Self {
        self.expose_diagnostics = expose;
        self
    }

    pub fn routes(&self) -> &ProxyRouteTable {
        &self.routes
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn expose_diagnostics(&self) -> bool {
        self.expose_diagnostics
    }

    /// True when the route table has an entry for `path`
    pub fn matches(&self, path: &str) -> bool {
        self.routes.resolve(path).is_some()
    }

    /// Resolve the route for the request path and forward it.
    ///
    /// Never fails: every [`ProxyError`] becomes its JSON envelope.
    pub async fn handle<B>(&self, req: Request<B>, cookies: &CookieJar) -> Resp
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let resolved = self
            .routes
            .resolve(req.uri().path())
            .map(|m| (m.target.service, m.upstream_path()));

        let result = match resolved {
            Some((service, upstream_path)) => {
                self.dispatch(req, service, &upstream_path, cookies).await
            }
            None => Err(ProxyError::NotFound),
        };

        result.unwrap_or_else(|err| err.into_response(self.expose_diagnostics))
    }

    /// Forward `req` to `upstream_path` on `service`.
    ///
    /// Checks run in order: base URL configured, bearer token present, then
    /// the upstream call. Nothing goes on the wire before both checks pass.
    pub async fn dispatch<B>(
        &self,
        req: Request<B>,
        service: ServiceKind,
        upstream_path: &str,
        cookies: &CookieJar,
    ) -> std::result::Result<Resp, ProxyError>
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let base = self
            .registry
            .base_url(service)
            .ok_or(ProxyError::ConfigurationMissing(service))?;

        let token = derive_bearer(req.headers(), cookies, &self.token_cookies)
            .ok_or(ProxyError::Unauthorized)?;

        let mut target = format!("{}{}", base, upstream_path);
        if let Some(query) = req.uri().query().filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }

        let mut headers = outbound_request_headers(req.headers());
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ProxyError::BadRequest("invalid bearer token".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        add_forwarding_headers(&req, &mut headers);

        log::debug!("proxy {} {} -> {} ({})", req.method(), req.uri().path(), target, service);

        let (parts, body) = req.into_parts();
        let mut outbound = self.client.request(parts.method.clone(), &target).headers(headers);
        if has_body(&parts.method) {
            outbound = outbound.body(outbound_body(body));
        }

        let unreachable = |err: reqwest::Error| {
            let detail = error_detail(&err);
            log::warn!(
                "upstream unreachable: service={} target={} detail={}",
                service,
                target,
                detail
            );
            ProxyError::UpstreamUnreachable { target: target.clone(), detail }
        };

        let upstream = outbound.send().await.map_err(&unreachable)?;
        let status = upstream.status();
        let response_headers = relayed_response_headers(upstream.headers());
        let bytes = upstream.bytes().await.map_err(&unreachable)?;

        if status.as_u16() >= 400 {
            log::info!("upstream error: service={} status={}", service, status.as_u16());
            return Err(ProxyError::Upstream { status, body: bytes });
        }

        let mut resp = Response::new(body_from(bytes));
        *resp.status_mut() = status;
        *resp.headers_mut() = response_headers;
        Ok(resp)
    }

    /// Relay a page request to the front-end server.
    ///
    /// Cookies are forwarded and no token is required; the front end's status
    /// and body come back verbatim, errors included.
    pub async fn relay_page<B>(&self, req: Request<B>, base_url: &str) -> Resp
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let target = format!("{}{}", base_url.trim_end_matches('/'), path_and_query(&req));
        let mut headers = page_request_headers(req.headers());
        add_forwarding_headers(&req, &mut headers);

        let (parts, body) = req.into_parts();
        let mut outbound = self.client.request(parts.method.clone(), &target).headers(headers);
        if has_body(&parts.method) {
            outbound = outbound.body(outbound_body(body));
        }

        let result = async {
            let upstream = outbound.send().await?;
            let status = upstream.status();
            let headers = relayed_response_headers(upstream.headers());
            let bytes = upstream.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, bytes))
        }
        .await;

        match result {
            Ok((status, headers, bytes)) => {
                let mut resp = Response::new(body_from(bytes));
                *resp.status_mut() = status;
                *resp.headers_mut() = headers;
                resp
            }
            Err(err) => {
                let detail = error_detail(&err);
                log::warn!("frontend unreachable: target={} detail={}", target, detail);
                ProxyError::UpstreamUnreachable { target, detail }
                    .into_response(self.expose_diagnostics)
            }
        }
    }
}
