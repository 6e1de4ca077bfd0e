pub mod annotate;
pub mod dom;
pub mod markup;
pub mod rules;
pub mod trigger;

// Re-export key types for easier usage
pub use annotate::{
    AnnotatedFragment, Annotator, LinkRun, Match, PlannedEdit, Run, ScanPlan, ScanReport,
    SkipPolicy, Span, scan,
};
pub use dom::{Document, Element, MutationKind, MutationRecord, NodeData, NodeId, Origin};
pub use rules::{Boundary, LinkAttrs, PatternRule, Preset, RuleError, RuleSet};
pub use trigger::ScanTrigger;
