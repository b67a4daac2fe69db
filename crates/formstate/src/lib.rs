//! Form validation state for nested JSON documents.
//!
//! A [`ValidationEngine`] holds a document, the set of touched fields and a
//! validate-all flag. On demand it runs a [`Schema`] over the document and
//! projects the resulting issues into an [`ErrorTree`] that has the same
//! shape as the document. While validate-all is off only touched fields
//! show errors.
//!
//! Multi-step forms gate forward navigation with
//! [`ValidationEngine::advance_step`] or the [`Wizard`] helper.
//!
//! # Example
//!
//! ```
//! use formstate::{GateDecision, ModifyMethod, ValidationEngine};
//! use formstate_schema::{Rule, RuleSchema};
//! use serde_json::json;
//!
//! let schema = RuleSchema::builder()
//!     .field("labels[*].label", [Rule::Required])
//!     .build()
//!     .unwrap();
//! let mut engine = ValidationEngine::new(schema, json!({"labels": [{"label": "Cat"}]}));
//!
//! engine.set_field("labels[1].label", json!("")).unwrap();
//! assert!(engine.current_errors().is_empty());
//!
//! engine.touch_fields_at(["labels[1].label"], ModifyMethod::Set).unwrap();
//! assert_eq!(
//!     engine.current_errors().as_value(),
//!     &json!({"labels": [null, {"label": "This field is required."}]})
//! );
//!
//! let step = [engine.path("labels").unwrap()];
//! assert_eq!(engine.advance_step(&step), GateDecision::Blocked { error_count: 1 });
//! ```

pub mod engine;
pub mod error;
pub mod errors;
pub mod options;
pub mod step;
pub mod submit;
pub mod touched;
pub mod wizard;

pub use formstate_path::{FieldPath, MalformedPathError, PathSegment};
pub use formstate_schema::{Schema, ValidationIssue};

pub use engine::{EngineState, ModifyMethod, StatePatch, ValidationEngine};
pub use error::FormError;
pub use errors::{project, ErrorTree};
pub use options::FormOptions;
pub use step::{is_step_valid, step_error_count, GateDecision};
pub use submit::{SubmitError, Submitter};
pub use touched::TouchedTree;
pub use wizard::{StepOutcome, Wizard, WizardStep};
