//! Per-request pipeline
//!
//! `/api` traffic is answered locally or forwarded by the BFF proxy. Page
//! traffic goes through locale resolution, classification and the enforcer,
//! then on to the front end. Whatever comes out is decorated exactly once.

use crate::app::local::{self, DevAuth, DEV_SIGN_IN_PATH, DEV_SIGN_OUT_PATH, HEALTH_PATH};
use crate::config::EdgeConfig;
use crate::error::Result;
use crate::guard::{
    build_identity_resolver, decide, Decision, IdentityResolver, RedirectTargets, RequestContext,
};
use crate::http::utils::{not_found_response, redirect_response, BoxError, Resp};
use crate::http::CookieJar;
use crate::locale::{LocaleResolution, LocaleResolver};
use crate::notify::{NotificationBus, NotificationHandlers};
use crate::proxy::ProxyDispatcher;
use crate::routing::{matches_segment_prefix, AccessPolicy, RouteClassifier};
use crate::security::ResponseDecorator;
use bytes::Bytes;
use http_body::Body;
use hyper::{Method, Request, StatusCode};
use std::sync::Arc;

/// Everything needed to answer one request, built once at start
pub struct EdgeService {
    locales: LocaleResolver,
    classifier: RouteClassifier,
    identity: Arc<dyn IdentityResolver>,
    targets: RedirectTargets,
    decorator: ResponseDecorator,
    proxy: ProxyDispatcher,
    notifications: NotificationHandlers,
    stream_path: String,
    publish_path: String,
    dev_auth: Option<DevAuth>,
    frontend_url: Option<String>,
}

impl EdgeService {
    pub fn from_config(config: &EdgeConfig, bus: Arc<NotificationBus>) -> Result<Self> {
        Ok(Self {
            locales: LocaleResolver::new(&config.locales),
            classifier: RouteClassifier::new(AccessPolicy::from_config(&config.access)),
            identity: build_identity_resolver(&config.identity),
            targets: RedirectTargets::from_config(&config.access),
            decorator: ResponseDecorator::from_config(&config.security, &config.identity)?,
            proxy: ProxyDispatcher::from_config(config)?,
            notifications: NotificationHandlers::new(bus, &config.notifications)
                .with_max_body_size(config.server.max_body_size),
            stream_path: config.notifications.stream_path.clone(),
            publish_path: config.notifications.publish_path.clone(),
            dev_auth: config.dev.mock_auth.then(|| {
                DevAuth::new(&config.identity).with_max_body_size(config.server.max_body_size)
            }),
            frontend_url: config
                .frontend
                .upstream_url
                .as_deref()
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
        })
    }

    /// Swap the proxy dispatcher, e.g. for one with a custom client
    pub fn with_proxy(mut self, proxy: ProxyDispatcher) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        self.notifications.bus()
    }

    pub fn proxy(&self) -> &ProxyDispatcher {
        &self.proxy
    }

    pub fn classifier(&self) -> &RouteClassifier {
        &self.classifier
    }

    /// Answer one request. Never fails; the response always carries the
    /// security headers and, when missing from the request, a CSRF cookie.
    pub async fn handle<B>(&self, req: Request<B>) -> Resp
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let cookies = CookieJar::from_headers(req.headers());
        let resp = self.route(req, &cookies).await;
        self.decorator.decorate(resp, &cookies)
    }

    async fn route<B>(&self, req: Request<B>, cookies: &CookieJar) -> Resp
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let path = req.uri().path().to_string();

        if matches_segment_prefix(&path, "/api") {
            return self.api(req, &path, cookies).await;
        }
        if self.classifier.is_excluded(&path) && !self.is_gated_page(&path) {
            return self.pass_through(req).await;
        }

        let (locale, rest) = match self.locales.resolve(&path, req.uri().query()) {
            LocaleResolution::Redirect(location) => {
                return redirect_response(StatusCode::TEMPORARY_REDIRECT, &location);
            }
            LocaleResolution::Localized { locale, rest } => (locale, rest),
        };

        let identity = self.identity.resolve(cookies);
        let ctx = RequestContext {
            class: self.classifier.classify(&rest),
            path,
            query: req.uri().query().map(str::to_string),
            locale,
            has_session: identity.has_session(),
            role: identity.role,
            cookies: cookies.clone(),
        };

        match decide(&ctx, &self.targets) {
            Decision::Redirect(location) => {
                log::debug!(
                    "gated {} ({}, role={}) -> {}",
                    ctx.path,
                    ctx.class.as_str(),
                    ctx.role,
                    location
                );
                redirect_response(StatusCode::FOUND, &location)
            }
            Decision::Allow => self.pass_through(req).await,
        }
    }

    /// A localized path under a gated prefix, e.g. `/ro/admin/users.csv`
    fn is_gated_page(&self, path: &str) -> bool {
        self.locales.split_locale(path).is_some_and(|(_, rest)| self.classifier.is_gated(rest))
    }

    async fn api<B>(&self, req: Request<B>, path: &str, cookies: &CookieJar) -> Resp
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        if path == HEALTH_PATH {
            return local::health(self.notifications.bus());
        }
        if path == self.stream_path {
            return match *req.method() {
                Method::GET => self.notifications.stream(req.uri().query()),
                _ => local::method_not_allowed(),
            };
        }
        if path == self.publish_path {
            return match *req.method() {
                Method::POST => self.notifications.publish(req).await,
                _ => local::method_not_allowed(),
            };
        }
        if let Some(dev) = &self.dev_auth {
            if path == DEV_SIGN_IN_PATH || path == DEV_SIGN_OUT_PATH {
                if req.method() != Method::POST {
                    return local::method_not_allowed();
                }
                return if path == DEV_SIGN_IN_PATH { dev.sign_in(req).await } else { dev.sign_out() };
            }
        }
        self.proxy.handle(req, cookies).await
    }

    async fn pass_through<B>(&self, req: Request<B>) -> Resp
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        match &self.frontend_url {
            Some(base) => self.proxy.relay_page(req, base).await,
            None => not_found_response(),
        }
    }
}
