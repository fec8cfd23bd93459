//! Module kinds and the module schema.
//!
//! [`ModuleKind`] is the closed set of node behaviours this build knows how to
//! evaluate, plus an [`Unknown`](ModuleKind::Unknown) catch-all so graphs that
//! mention newer kinds still load (and evaluate to silence). Each variant has
//! exactly one pure evaluation function in [`ModuleKind::evaluate`].
//!
//! [`ModuleSchema`] is external configuration: a mapping from kind name to port
//! counts and instance limits. The store consults it for declared input counts
//! and the control-side [`Patch`](crate::Patch) for port validation.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

/// The behaviour of a node.
///
/// Wire names follow the editor's module ids (`"Sin"`, `"Const"`, `"Out"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    /// Emits its parsed content, ignoring inputs.
    Constant,
    /// `sin(2π · f · t)` with frequency from input 0.
    Sine,
    /// Rising ramp in `[-1, 1)` with frequency from input 0.
    Sawtooth,
    /// ±1 pulse at 50% duty with frequency from input 0.
    Square,
    /// Symmetric triangle in `[-1, 1]` with frequency from input 0.
    Triangle,
    /// `input0 + input1`.
    Add,
    /// `input0 - input1`.
    Subtract,
    /// `input0 * input1`.
    Multiply,
    /// `input0 / input1`, 0 when the divisor is 0.
    Divide,
    /// Emits its content, which the control side keeps at the current note frequency.
    Midi,
    /// Passes input 0 to the mix bus.
    Output,
    /// Free-text annotation. No ports, evaluates to 0.
    Notes,
    /// A kind this build does not implement. Evaluates to 0.
    Unknown(String),
}

impl ModuleKind {
    /// Every kind with a dedicated evaluation function.
    pub fn implemented() -> [ModuleKind; 12] {
        [
            Self::Constant,
            Self::Sine,
            Self::Sawtooth,
            Self::Square,
            Self::Triangle,
            Self::Add,
            Self::Subtract,
            Self::Multiply,
            Self::Divide,
            Self::Midi,
            Self::Output,
            Self::Notes,
        ]
    }

    /// Maps a wire name to a kind. Unrecognized names become [`Unknown`](Self::Unknown).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Const" => Self::Constant,
            "Sin" => Self::Sine,
            "Saw" => Self::Sawtooth,
            "Squ" => Self::Square,
            "Tri" => Self::Triangle,
            "Add" => Self::Add,
            "Sub" => Self::Subtract,
            "Mul" => Self::Multiply,
            "Div" => Self::Divide,
            "Midi" => Self::Midi,
            "Out" => Self::Output,
            "Not" => Self::Notes,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the wire name.
    pub fn name(&self) -> &str {
        match self {
            Self::Constant => "Const",
            Self::Sine => "Sin",
            Self::Sawtooth => "Saw",
            Self::Square => "Squ",
            Self::Triangle => "Tri",
            Self::Add => "Add",
            Self::Subtract => "Sub",
            Self::Multiply => "Mul",
            Self::Divide => "Div",
            Self::Midi => "Midi",
            Self::Output => "Out",
            Self::Notes => "Not",
            Self::Unknown(name) => name,
        }
    }

    /// Computes this kind's sample at `time` seconds.
    ///
    /// `content` is the node's parsed content payload. `input(i)` resolves the
    /// value arriving at input port `i` (0 when unconnected); it is only called
    /// for the ports this kind actually reads.
    pub fn evaluate(&self, content: f64, time: f64, mut input: impl FnMut(u32) -> f64) -> f64 {
        match self {
            Self::Constant | Self::Midi => content,
            Self::Sine => libm::sin(TAU * input(0) * time),
            Self::Sawtooth => 2.0 * phase(time * input(0)) - 1.0,
            Self::Square => {
                if phase(time * input(0)) < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Triangle => 2.0 * libm::fabs(2.0 * phase(time * input(0)) - 1.0) - 1.0,
            Self::Add => input(0) + input(1),
            Self::Subtract => input(0) - input(1),
            Self::Multiply => input(0) * input(1),
            Self::Divide => {
                let numerator = input(0);
                let divisor = input(1);
                if divisor == 0.0 { 0.0 } else { numerator / divisor }
            }
            Self::Output => input(0),
            Self::Notes | Self::Unknown(_) => 0.0,
        }
    }
}

/// Fractional cycle position, truncated remainder (negative stays negative).
#[inline]
fn phase(cycles: f64) -> f64 {
    libm::fmod(cycles, 1.0)
}

impl FromStr for ModuleKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Port layout and limits for one module kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Display name; also the stem of generated node ids.
    pub name: String,
    /// Number of input ports.
    pub inputs: u32,
    /// Number of output ports.
    pub outputs: u32,
    /// Maximum number of instances in one patch, if limited.
    pub max_instances: Option<u32>,
}

impl ModuleSpec {
    /// Creates an unlimited spec.
    pub fn new(name: impl Into<String>, inputs: u32, outputs: u32) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            max_instances: None,
        }
    }

    /// Limits the number of instances.
    pub fn with_max_instances(mut self, max: u32) -> Self {
        self.max_instances = Some(max);
        self
    }
}

/// Mapping from module kind name to [`ModuleSpec`].
///
/// Kinds absent from the schema have no ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSchema {
    modules: BTreeMap<String, ModuleSpec>,
}

impl ModuleSchema {
    /// Creates an empty schema.
    pub fn empty() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }

    /// The editor's stock module set.
    pub fn builtin() -> Self {
        let mut schema = Self::empty();
        for (kind, spec) in [
            ("Sin", ModuleSpec::new("Sin", 1, 1)),
            ("Squ", ModuleSpec::new("Squ", 1, 1)),
            ("Tri", ModuleSpec::new("Tri", 1, 1)),
            ("Saw", ModuleSpec::new("Saw", 1, 1)),
            ("Add", ModuleSpec::new("Add", 2, 1)),
            ("Sub", ModuleSpec::new("Sub", 2, 1)),
            ("Const", ModuleSpec::new("Const", 0, 1)),
            ("Mul", ModuleSpec::new("Mul", 2, 1)),
            ("Div", ModuleSpec::new("Div", 2, 1)),
            ("Midi", ModuleSpec::new("MIDI", 0, 1).with_max_instances(1)),
            ("Fil", ModuleSpec::new("Fil", 1, 1)),
            ("ADSR", ModuleSpec::new("ADSR", 5, 1)),
            ("Not", ModuleSpec::new("Notes", 0, 0)),
            ("Out", ModuleSpec::new("Out", 1, 0).with_max_instances(1)),
        ] {
            schema.insert(kind, spec);
        }
        schema
    }

    /// Adds or replaces the spec for `kind`.
    pub fn insert(&mut self, kind: impl Into<String>, spec: ModuleSpec) {
        self.modules.insert(kind.into(), spec);
    }

    /// Overlays every entry of `other` onto this schema.
    pub fn merge(&mut self, other: ModuleSchema) {
        self.modules.extend(other.modules);
    }

    /// Looks up the spec for a kind.
    pub fn spec(&self, kind: &ModuleKind) -> Option<&ModuleSpec> {
        self.modules.get(kind.name())
    }

    /// Declared input count (0 for kinds not in the schema).
    #[inline]
    pub fn inputs(&self, kind: &ModuleKind) -> u32 {
        self.spec(kind).map_or(0, |s| s.inputs)
    }

    /// Declared output count (0 for kinds not in the schema).
    #[inline]
    pub fn outputs(&self, kind: &ModuleKind) -> u32 {
        self.spec(kind).map_or(0, |s| s.outputs)
    }

    /// Iterates `(kind name, spec)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleSpec)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of kinds in the schema.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if the schema has no kinds.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_name_round_trip() {
        for kind in ModuleKind::implemented() {
            assert_eq!(ModuleKind::from_name(kind.name()), kind);
        }
        assert_eq!(
            ModuleKind::from_name("ADSR"),
            ModuleKind::Unknown("ADSR".to_string())
        );
        assert_eq!("Fil".parse::<ModuleKind>().unwrap().name(), "Fil");
    }

    #[test]
    fn test_constant_ignores_inputs() {
        let mut calls = 0;
        let v = ModuleKind::Constant.evaluate(3.0, 1.0, |_| {
            calls += 1;
            100.0
        });
        assert_eq!(v, 3.0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_sine_formula() {
        // 2 Hz at t = 0.25 is half a cycle.
        let v = ModuleKind::Sine.evaluate(0.0, 0.25, |_| 2.0);
        assert!(approx(v, 0.0), "got {v}");
        let v = ModuleKind::Sine.evaluate(0.0, 0.125, |_| 2.0);
        assert!(approx(v, 1.0), "got {v}");
    }

    #[test]
    fn test_sawtooth_formula() {
        assert!(approx(ModuleKind::Sawtooth.evaluate(0.0, 0.0, |_| 1.0), -1.0));
        assert!(approx(ModuleKind::Sawtooth.evaluate(0.0, 0.25, |_| 1.0), -0.5));
        assert!(approx(ModuleKind::Sawtooth.evaluate(0.0, 0.75, |_| 1.0), 0.5));
    }

    #[test]
    fn test_square_formula() {
        assert_eq!(ModuleKind::Square.evaluate(0.0, 0.1, |_| 1.0), 1.0);
        assert_eq!(ModuleKind::Square.evaluate(0.0, 0.6, |_| 1.0), -1.0);
        assert_eq!(ModuleKind::Square.evaluate(0.0, 0.0, |_| 0.0), 1.0);
    }

    #[test]
    fn test_triangle_formula() {
        assert!(approx(ModuleKind::Triangle.evaluate(0.0, 0.0, |_| 1.0), 1.0));
        assert!(approx(ModuleKind::Triangle.evaluate(0.0, 0.25, |_| 1.0), 0.0));
        assert!(approx(ModuleKind::Triangle.evaluate(0.0, 0.5, |_| 1.0), -1.0));
    }

    #[test]
    fn test_negative_phase_is_truncated() {
        // fmod keeps the sign of the dividend: -0.25 cycles -> phase -0.25.
        let v = ModuleKind::Sawtooth.evaluate(0.0, 0.25, |_| -1.0);
        assert!(approx(v, -1.5), "got {v}");
    }

    #[test]
    fn test_arithmetic() {
        let inputs = |i: u32| if i == 0 { 6.0 } else { 3.0 };
        assert_eq!(ModuleKind::Add.evaluate(0.0, 0.0, inputs), 9.0);
        assert_eq!(ModuleKind::Subtract.evaluate(0.0, 0.0, inputs), 3.0);
        assert_eq!(ModuleKind::Multiply.evaluate(0.0, 0.0, inputs), 18.0);
        assert_eq!(ModuleKind::Divide.evaluate(0.0, 0.0, inputs), 2.0);
    }

    #[test]
    fn test_divide_by_zero_is_silent() {
        let v = ModuleKind::Divide.evaluate(0.0, 0.0, |i| if i == 0 { 1.0 } else { 0.0 });
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_unknown_and_notes_are_silent() {
        assert_eq!(ModuleKind::Notes.evaluate(9.0, 1.0, |_| 1.0), 0.0);
        assert_eq!(
            ModuleKind::Unknown("Fil".into()).evaluate(9.0, 1.0, |_| 1.0),
            0.0
        );
    }

    #[test]
    fn test_builtin_schema_ports() {
        let schema = ModuleSchema::builtin();
        assert_eq!(schema.inputs(&ModuleKind::Add), 2);
        assert_eq!(schema.outputs(&ModuleKind::Output), 0);
        assert_eq!(schema.inputs(&ModuleKind::Constant), 0);
        assert_eq!(
            schema.spec(&ModuleKind::Midi).unwrap().max_instances,
            Some(1)
        );
        assert_eq!(schema.inputs(&ModuleKind::Unknown("Fil".into())), 1);
        assert_eq!(schema.inputs(&ModuleKind::Unknown("Nope".into())), 0);
    }

    #[test]
    fn test_merge_overrides() {
        let mut schema = ModuleSchema::builtin();
        let mut extra = ModuleSchema::empty();
        extra.insert("Add", ModuleSpec::new("Add", 3, 1));
        extra.insert("Gain", ModuleSpec::new("Gain", 1, 1));
        let before = schema.len();
        schema.merge(extra);
        assert_eq!(schema.inputs(&ModuleKind::Add), 3);
        assert_eq!(schema.len(), before + 1);
    }
}
