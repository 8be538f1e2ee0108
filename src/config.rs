//! Configuration for a split run.
//!
//! Every knob lives in [`SplitConfig`], built through
//! [`SplitConfigBuilder`]. Defaults reproduce the DossierFacile layout, so
//! `SplitConfig::default()` is what almost every caller wants.

use crate::error::SplitError;
use crate::pipeline::slug::MAX_SLUG_LEN;
use crate::pipeline::titles::{FixedLineRule, TitleRule, COVER_PAGE_TITLE};
use crate::progress::{ProgressCallback, SplitProgressCallback};
use std::fmt;
use std::sync::Arc;

/// Configuration for splitting one PDF export.
///
/// # Example
/// ```rust
/// use dossier_split::{FixedLineRule, SplitConfig};
/// use std::sync::Arc;
///
/// let config = SplitConfig::builder()
///     .title_rule(Arc::new(FixedLineRule::new(4)))
///     .max_slug_len(40)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_slug_len, 40);
/// ```
#[derive(Clone)]
pub struct SplitConfig {
    /// User password for encrypted exports. Default: none.
    pub password: Option<String>,

    /// Title forced onto page 1. Default: `"Page de garde DossierFacile"`.
    pub cover_title: String,

    /// How a page's text becomes its title. Default: [`FixedLineRule`]
    /// reading the 4th line.
    pub title_rule: Arc<dyn TitleRule>,

    /// Maximum length of the slug part of generated filenames. Default: 80.
    pub max_slug_len: usize,

    /// Archive base name used when the caller does not supply one.
    /// Default: `"extracted"`.
    pub zip_basename: String,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            password: None,
            cover_title: COVER_PAGE_TITLE.to_string(),
            title_rule: Arc::new(FixedLineRule::default()),
            max_slug_len: MAX_SLUG_LEN,
            zip_basename: "extracted".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cover_title", &self.cover_title)
            .field("title_rule", &"<dyn TitleRule>")
            .field("max_slug_len", &self.max_slug_len)
            .field("zip_basename", &self.zip_basename)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SplitProgressCallback>"),
            )
            .finish()
    }
}

impl SplitConfig {
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SplitConfig`].
#[derive(Debug)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn cover_title(mut self, title: impl Into<String>) -> Self {
        self.config.cover_title = title.into();
        self
    }

    pub fn title_rule(mut self, rule: Arc<dyn TitleRule>) -> Self {
        self.config.title_rule = rule;
        self
    }

    pub fn max_slug_len(mut self, n: usize) -> Self {
        self.config.max_slug_len = n;
        self
    }

    pub fn zip_basename(mut self, name: impl Into<String>) -> Self {
        self.config.zip_basename = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn SplitProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, SplitError> {
        let c = &self.config;
        if c.cover_title.trim().is_empty() {
            return Err(SplitError::InvalidConfig(
                "cover title must not be empty".into(),
            ));
        }
        if c.max_slug_len == 0 {
            return Err(SplitError::InvalidConfig(
                "max slug length must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
