use std::env;
use std::fmt::Debug;

use gonepal_model::ErrorKind;

use crate::Error;

/// The model used when none is configured.
pub const DEFAULT_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";
/// The OpenRouter API root.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Sent as `HTTP-Referer` when no site URL is configured.
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";
/// Sent as `X-Title` when no app title is configured.
pub const DEFAULT_APP_TITLE: &str = "AI Travel Assistant";

/// Environment variables, in lookup order, that may hold the API key.
pub const API_KEY_VARS: [&str; 2] =
    ["OPENROUTER_API_KEY", "VITE_OPENROUTER_API_KEY"];

/// Builder for [`OpenRouterConfig`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct OpenRouterConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    site_url: Option<String>,
    app_title: Option<String>,
}

impl OpenRouterConfigBuilder {
    /// Creates an empty builder. [`build`](Self::build) fails until an API
    /// key is set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Creates a builder from the process environment.
    ///
    /// Reads `OPENROUTER_API_KEY` (or `VITE_OPENROUTER_API_KEY`),
    /// `OPENROUTER_MODEL`, `OPENROUTER_BASE_URL`, `GONEPAL_SITE_URL` and
    /// `GONEPAL_APP_TITLE`. Missing variables are left unset.
    #[inline]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a builder from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            api_key: API_KEY_VARS.iter().find_map(|name| non_empty(*name)),
            model: non_empty("OPENROUTER_MODEL"),
            base_url: non_empty("OPENROUTER_BASE_URL"),
            site_url: non_empty("GONEPAL_SITE_URL"),
            app_title: non_empty("GONEPAL_APP_TITLE"),
        }
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the site URL reported in the `HTTP-Referer` header.
    #[inline]
    pub fn with_site_url<S: Into<String>>(mut self, site_url: S) -> Self {
        self.site_url = Some(site_url.into());
        self
    }

    /// Sets the app title reported in the `X-Title` header.
    #[inline]
    pub fn with_app_title<S: Into<String>>(mut self, app_title: S) -> Self {
        self.app_title = Some(app_title.into());
        self
    }

    /// Builds the configuration.
    ///
    /// Fails with [`ErrorKind::Configuration`] when no API key is set, so
    /// that a provider can never be created without a credential.
    pub fn build(self) -> Result<OpenRouterConfig, Error> {
        let Some(api_key) = self.api_key.filter(|key| !key.trim().is_empty())
        else {
            return Err(Error::new(
                "OpenRouter API key is not configured",
                ErrorKind::Configuration,
            ));
        };
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Ok(OpenRouterConfig {
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            base_url: base_url.trim_end_matches('/').to_owned(),
            site_url: self
                .site_url
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_owned()),
            app_title: self
                .app_title
                .unwrap_or_else(|| DEFAULT_APP_TITLE.to_owned()),
        })
    }
}

impl Debug for OpenRouterConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfigBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<deducted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("site_url", &self.site_url)
            .field("app_title", &self.app_title)
            .finish()
    }
}

/// Configuration for the OpenRouter provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OpenRouterConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) site_url: String,
    pub(crate) app_title: String,
}

impl OpenRouterConfig {
    /// Returns the model identifier sent with every request.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the API root, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("api_key", &"<deducted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("site_url", &self.site_url)
            .field("app_title", &self.app_title)
            .finish()
    }
}
