//! Fingerprint matching for door access.
//!
//! This crate provides:
//! - `FingerprintTemplate`: the minutiae set a verification works on
//! - `TemplateExtractor`: the capability that turns raw payloads into templates
//! - `MinutiaeMatcher`: alignment-based scoring with a configurable threshold
//!
//! # Example
//!
//! ```
//! use nexus_biometric::{
//!     FingerprintTemplate, MatcherConfig, Minutia, MinutiaKind, MinutiaeMatcher,
//!     MinutiaeRecordExtractor, TemplateExtractor,
//! };
//!
//! let template = FingerprintTemplate::new(
//!     256,
//!     256,
//!     vec![
//!         Minutia::new(40, 52, 90, MinutiaKind::RidgeEnding),
//!         Minutia::new(120, 80, 30, MinutiaKind::Bifurcation),
//!         Minutia::new(200, 150, 270, MinutiaKind::RidgeEnding),
//!     ],
//! )
//! .expect("valid template");
//!
//! let raw = template.to_record_bytes();
//! let extracted = MinutiaeRecordExtractor.extract(&raw).expect("parses");
//!
//! let matcher = MinutiaeMatcher::new(MatcherConfig::default());
//! let score = matcher.score(&extracted, &template);
//! assert!(matcher.is_match(score));
//! ```

pub mod error;
pub mod extract;
pub mod matcher;
pub mod template;

pub use error::BiometricError;
pub use extract::{MinutiaeRecordExtractor, TemplateExtractor};
pub use matcher::{MatchScore, MatcherConfig, MinutiaeMatcher};
pub use template::{FingerprintTemplate, Minutia, MinutiaKind};
