//! Multi-step wizards on top of the step gate.
//!
//! Forward moves are gated on the step being left; backward moves never
//! are.

use serde::{Deserialize, Serialize};

use formstate_path::FieldPath;
use formstate_schema::Schema;

use crate::engine::ValidationEngine;
use crate::step::GateDecision;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardStep {
    pub name: String,
    /// Path prefixes owned by this step.
    pub fields: Vec<FieldPath>,
}

impl WizardStep {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = FieldPath>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    /// Navigation cancelled: `step` still has `error_count` errors.
    Blocked { step: usize, error_count: usize },
    /// The last step was left successfully.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    steps: Vec<WizardStep>,
    current: usize,
}

impl Wizard {
    pub fn new(steps: Vec<WizardStep>) -> Self {
        Self { steps, current: 0 }
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> Option<&WizardStep> {
        self.steps.get(self.current)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    /// Try to leave the current step forwards.
    pub fn next<S: Schema>(&mut self, engine: &mut ValidationEngine<S>) -> StepOutcome {
        let Some(step) = self.steps.get(self.current) else {
            return StepOutcome::Finished;
        };
        match engine.advance_step(&step.fields) {
            GateDecision::Blocked { error_count } => {
                tracing::debug!(step = %step.name, error_count, "wizard step blocked");
                StepOutcome::Blocked {
                    step: self.current,
                    error_count,
                }
            }
            GateDecision::Proceed if self.is_last() => StepOutcome::Finished,
            GateDecision::Proceed => {
                let from = self.current;
                self.current += 1;
                tracing::debug!(from, to = self.current, "wizard advanced");
                StepOutcome::Advanced {
                    from,
                    to: self.current,
                }
            }
        }
    }

    /// Step back one step. Returns `None` on the first step.
    pub fn back(&mut self) -> Option<StepOutcome> {
        let from = self.current;
        self.current = from.checked_sub(1)?;
        Some(StepOutcome::Retreated {
            from,
            to: self.current,
        })
    }

    /// Jump to `target` (clamped to the last step). Jumping forward gates
    /// every step passed over and stops at the first one with errors.
    pub fn go_to<S: Schema>(&mut self, target: usize, engine: &mut ValidationEngine<S>) -> StepOutcome {
        let target = target.min(self.steps.len().saturating_sub(1));
        let from = self.current;
        if target <= from {
            self.current = target;
            return StepOutcome::Retreated { from, to: target };
        }
        while self.current < target {
            match self.next(engine) {
                StepOutcome::Advanced { .. } => {}
                other => return other,
            }
        }
        StepOutcome::Advanced {
            from,
            to: self.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formstate_schema::{Rule, RuleSchema};
    use serde_json::json;

    fn p(path: &str) -> FieldPath {
        path.parse().unwrap()
    }

    fn job_wizard() -> (Wizard, ValidationEngine<RuleSchema>) {
        let schema = RuleSchema::builder()
            .field("job.name", [Rule::Required])
            .field("labels[*].label", [Rule::Required])
            .build()
            .unwrap();
        let engine = ValidationEngine::new(
            schema,
            json!({"job": {"name": ""}, "labels": [{"label": ""}]}),
        );
        let wizard = Wizard::new(vec![
            WizardStep::new("details", [p("job")]),
            WizardStep::new("labels", [p("labels")]),
            WizardStep::new("review", Vec::new()),
        ]);
        (wizard, engine)
    }

    #[test]
    fn test_next_blocks_then_advances() {
        let (mut wizard, mut engine) = job_wizard();
        assert_eq!(wizard.next(&mut engine), StepOutcome::Blocked { step: 0, error_count: 1 });
        assert_eq!(wizard.current(), 0);
        assert!(engine.state().validate_all);

        engine.set_field("job.name", json!("train")).unwrap();
        assert_eq!(wizard.next(&mut engine), StepOutcome::Advanced { from: 0, to: 1 });
        assert!(!engine.state().validate_all);
        // Labels step errors are hidden again until touched.
        assert!(engine.current_errors().is_empty());
    }

    #[test]
    fn test_back_is_never_gated() {
        let (mut wizard, mut engine) = job_wizard();
        assert_eq!(wizard.back(), None);
        engine.set_field("job.name", json!("train")).unwrap();
        wizard.next(&mut engine);
        assert_eq!(wizard.back(), Some(StepOutcome::Retreated { from: 1, to: 0 }));
    }

    #[test]
    fn test_go_to_stops_at_first_invalid_step() {
        let (mut wizard, mut engine) = job_wizard();
        engine.set_field("job.name", json!("train")).unwrap();
        assert_eq!(wizard.go_to(2, &mut engine), StepOutcome::Blocked { step: 1, error_count: 1 });
        assert_eq!(wizard.current(), 1);

        engine.set_field("labels[0].label", json!("Cat")).unwrap();
        assert_eq!(wizard.go_to(9, &mut engine), StepOutcome::Advanced { from: 1, to: 2 });
        assert!(wizard.is_last());
        assert_eq!(wizard.next(&mut engine), StepOutcome::Finished);
        assert_eq!(wizard.go_to(0, &mut engine), StepOutcome::Retreated { from: 2, to: 0 });
    }
}
