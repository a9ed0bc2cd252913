use std::time::Duration;

use thiserror::Error;

use crate::catalog::{
    self, CatalogError, CatalogSource, LoadFailurePolicy, Product, DEFAULT_PLACEHOLDER_COUNT,
};
use crate::controller::{Controller, DEFAULT_QUIET};
use crate::output::RenderSink;
use crate::pipeline::{PipelineOptions, SearchFields, DEFAULT_PAGE_SIZE};

#[derive(Clone, Debug)]
pub struct Options {
    pub source: CatalogSource,
    pub page_size: usize,
    pub search_fields: SearchFields,
    pub debounce: Duration,
    pub load_failure: LoadFailurePolicy,
    pub placeholder_count: usize,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: CatalogSource::Url(catalog::DEFAULT_SOURCE.to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            search_fields: SearchFields::default(),
            debounce: DEFAULT_QUIET,
            load_failure: LoadFailurePolicy::ShowError,
            placeholder_count: DEFAULT_PLACEHOLDER_COUNT,
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid page_size {value}, expected positive integer")]
    InvalidPageSize { value: usize },

    #[error("invalid placeholder_count {value}, expected positive integer")]
    InvalidPlaceholderCount { value: usize },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Outcome of the one startup load, after the failure policy was applied.
#[derive(Debug)]
pub enum CatalogLoad {
    Loaded(Vec<Product>),
    Placeholder {
        products: Vec<Product>,
        error: CatalogError,
    },
    Failed(CatalogError),
}

impl CatalogLoad {
    pub fn products(&self) -> Option<&[Product]> {
        match self {
            Self::Loaded(products) | Self::Placeholder { products, .. } => {
                Some(products.as_slice())
            }
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            Self::Loaded(_) => None,
            Self::Placeholder { error, .. } | Self::Failed(error) => Some(error),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.page_size == 0 {
            return Err(RunnerError::InvalidPageSize {
                value: options.page_size,
            });
        }
        if options.load_failure == LoadFailurePolicy::Placeholder && options.placeholder_count == 0
        {
            return Err(RunnerError::InvalidPlaceholderCount {
                value: options.placeholder_count,
            });
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            page_size: self.options.page_size,
            search_fields: self.options.search_fields.clone(),
        }
    }

    /// Fetches the catalog once. Catalog failures are not errors here; they
    /// come back as [`CatalogLoad::Failed`] or [`CatalogLoad::Placeholder`]
    /// depending on the configured policy.
    pub async fn load(&self) -> Result<CatalogLoad, RunnerError> {
        let client =
            build_catalog_client(self.options.proxy.as_deref(), self.options.timeout_seconds)?;
        let result = catalog::load_catalog(&self.options.source, &client).await;
        Ok(resolve_load(
            result,
            self.options.load_failure,
            self.options.placeholder_count,
        ))
    }

    pub fn controller<'a, S: RenderSink>(
        &self,
        catalog: &'a [Product],
        sink: S,
    ) -> Controller<'a, S> {
        Controller::new(catalog, self.pipeline_options(), sink).with_debounce(self.options.debounce)
    }
}

pub fn resolve_load(
    result: Result<Vec<Product>, CatalogError>,
    policy: LoadFailurePolicy,
    placeholder_count: usize,
) -> CatalogLoad {
    match result {
        Ok(products) => {
            tracing::info!(count = products.len(), "catalog loaded");
            CatalogLoad::Loaded(products)
        }
        Err(error) => match policy {
            LoadFailurePolicy::ShowError => {
                tracing::error!(error = %error, "catalog load failed");
                CatalogLoad::Failed(error)
            }
            LoadFailurePolicy::Placeholder => {
                tracing::warn!(
                    error = %error,
                    count = placeholder_count,
                    "catalog load failed, using placeholder deals"
                );
                CatalogLoad::Placeholder {
                    products: catalog::placeholder_catalog(placeholder_count),
                    error,
                }
            }
        },
    }
}

fn build_catalog_client(
    proxy: Option<&str>,
    timeout_seconds: usize,
) -> Result<reqwest::Client, RunnerError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!("dealgrid/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| RunnerError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunnerError::HttpClientBuild { source: e })
}
