//! # Spring Assembly
//!
//! Turns the mesh property table and the constitutive models of the soil
//! layers into nonlinear springs for the solver:
//!
//! - distributed p–y, m–t and t–z springs, one [`ElementSprings`] per element
//!   holding a curve at each end (top, bottom)
//! - base Hb, Mb and Q–z springs at the element containing the pile toe
//!
//! Every curve has the configured number of points. Families that are
//! disabled, or that the layer's model cannot produce, are zero-filled.
//! Assembly never fails on curve values; negative or non-finite entries are
//! reported as [`Diagnostic`]s.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SPRING_POINTS;
use crate::errors::{PileError, PileResult};
use crate::mesh::{ElementProperties, Mesh};
use crate::models::{AxialModel, AxialQuery, LateralModel, LateralQuery};
use crate::pile::Pile;
use crate::soil::{Layer, SoilProfile};

// ============================================================================
// Curves
// ============================================================================

/// A load–displacement curve: `value[i]` is mobilized at `abscissa[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpringCurve {
    pub value: Vec<f64>,
    pub abscissa: Vec<f64>,
}

impl SpringCurve {
    pub fn new(value: Vec<f64>, abscissa: Vec<f64>) -> Self {
        debug_assert_eq!(value.len(), abscissa.len());
        Self { value, abscissa }
    }

    /// All-zero curve of `n` points
    pub fn zeros(n: usize) -> Self {
        Self {
            value: vec![0.0; n],
            abscissa: vec![0.0; n],
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether every value and abscissa is zero
    pub fn is_zero(&self) -> bool {
        self.value.iter().chain(&self.abscissa).all(|&v| v == 0.0)
    }

    /// First problem found in the curve, non-finite entries first
    pub fn issue(&self) -> Option<ValueIssue> {
        let entries = || self.value.iter().chain(&self.abscissa);
        if entries().any(|v| !v.is_finite()) {
            Some(ValueIssue::NonFinite)
        } else if entries().any(|&v| v < 0.0) {
            Some(ValueIssue::Negative)
        } else {
            None
        }
    }

    /// Resize to `n` points, keeping the curve when the length already matches
    fn fit(self, n: usize) -> Self {
        if self.len() == n && self.abscissa.len() == n {
            self
        } else {
            let mut value = self.value;
            let mut abscissa = self.abscissa;
            let last_value = value.last().copied().unwrap_or(0.0);
            let last_abscissa = abscissa.last().copied().unwrap_or(0.0);
            value.resize(n, last_value);
            abscissa.resize(n, last_abscissa);
            Self { value, abscissa }
        }
    }
}

/// Element end
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum End {
    Top,
    Bottom,
}

impl End {
    pub const BOTH: [End; 2] = [End::Top, End::Bottom];

    fn index(self) -> usize {
        match self {
            End::Top => 0,
            End::Bottom => 1,
        }
    }
}

/// Curves at both ends of one element, index 0 top and 1 bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSprings {
    pub ends: [SpringCurve; 2],
}

impl ElementSprings {
    pub fn zeros(n: usize) -> Self {
        Self {
            ends: [SpringCurve::zeros(n), SpringCurve::zeros(n)],
        }
    }

    pub fn at(&self, end: End) -> &SpringCurve {
        &self.ends[end.index()]
    }

    pub fn is_zero(&self) -> bool {
        self.ends.iter().all(SpringCurve::is_zero)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Which spring families to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Distributed lateral springs (p–y)
    pub distributed_lateral: bool,
    /// Distributed moment springs (m–t)
    pub distributed_moment: bool,
    /// Distributed axial springs (t–z)
    pub distributed_axial: bool,
    /// Base shear spring (Hb)
    pub base_shear: bool,
    /// Base moment spring (Mb)
    pub base_moment: bool,
    /// Base axial spring (Q–z)
    pub base_axial: bool,
    /// Points per curve
    pub output_length: usize,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            distributed_lateral: true,
            distributed_moment: true,
            distributed_axial: false,
            base_shear: false,
            base_moment: false,
            base_axial: false,
            output_length: DEFAULT_SPRING_POINTS,
        }
    }
}

impl SpringConfig {
    /// Every family enabled
    pub fn all() -> Self {
        Self {
            distributed_lateral: true,
            distributed_moment: true,
            distributed_axial: true,
            base_shear: true,
            base_moment: true,
            base_axial: true,
            output_length: DEFAULT_SPRING_POINTS,
        }
    }

    /// Set the number of points per curve (builder pattern)
    pub fn with_output_length(mut self, n: usize) -> Self {
        self.output_length = n;
        self
    }

    pub fn validate(&self) -> PileResult<()> {
        if self.output_length < 2 {
            return Err(PileError::invalid_input(
                "output_length",
                self.output_length.to_string(),
                "Spring curves need at least 2 points",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Spring families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpringFamily {
    Py,
    Mt,
    Tz,
    Hb,
    Mb,
    Qz,
}

impl std::fmt::Display for SpringFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SpringFamily::Py => "p-y",
            SpringFamily::Mt => "m-t",
            SpringFamily::Tz => "t-z",
            SpringFamily::Hb => "Hb",
            SpringFamily::Mb => "Mb",
            SpringFamily::Qz => "Q-z",
        };
        write!(f, "{name}")
    }
}

/// What is wrong with a curve entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueIssue {
    Negative,
    NonFinite,
}

/// Non-fatal finding reported by the spring engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// A curve holds negative or non-finite entries
    OutOfRange {
        family: SpringFamily,
        element: usize,
        end: End,
        issue: ValueIssue,
    },

    /// A family is enabled but the layer's model cannot produce it
    UnsupportedFamily {
        family: SpringFamily,
        layer: String,
        model: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::OutOfRange {
                family,
                element,
                end,
                issue,
            } => write!(f, "{family} spring of element {element} ({end:?}) has {issue:?} entries"),
            Diagnostic::UnsupportedFamily { family, layer, model } => {
                write!(f, "{model} model of layer '{layer}' does not produce {family} springs")
            }
        }
    }
}

// ============================================================================
// Spring Set
// ============================================================================

/// All springs of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringSet {
    /// Distributed lateral springs, one per element
    pub py: Vec<ElementSprings>,
    /// Distributed moment springs, one per element
    pub mt: Vec<ElementSprings>,
    /// Distributed axial springs, one per element
    pub tz: Vec<ElementSprings>,
    /// Base shear spring
    pub hb: SpringCurve,
    /// Base moment spring
    pub mb: SpringCurve,
    /// Base axial spring
    pub qz: SpringCurve,
    /// Element carrying the base springs
    pub toe_element: usize,
    /// Findings collected during assembly
    pub diagnostics: Vec<Diagnostic>,
}

impl SpringSet {
    /// Distributed springs of one family
    pub fn distributed(&self, family: SpringFamily) -> Option<&[ElementSprings]> {
        match family {
            SpringFamily::Py => Some(self.py.as_slice()),
            SpringFamily::Mt => Some(self.mt.as_slice()),
            SpringFamily::Tz => Some(self.tz.as_slice()),
            _ => None,
        }
    }

    /// Base spring of one family
    pub fn base(&self, family: SpringFamily) -> Option<&SpringCurve> {
        match family {
            SpringFamily::Hb => Some(&self.hb),
            SpringFamily::Mb => Some(&self.mb),
            SpringFamily::Qz => Some(&self.qz),
            _ => None,
        }
    }

    fn scan(&mut self) {
        let mut found = Vec::new();
        for family in [SpringFamily::Py, SpringFamily::Mt, SpringFamily::Tz] {
            for (element, springs) in self.distributed(family).unwrap_or_default().iter().enumerate() {
                for end in End::BOTH {
                    if let Some(issue) = springs.at(end).issue() {
                        found.push(Diagnostic::OutOfRange {
                            family,
                            element,
                            end,
                            issue,
                        });
                    }
                }
            }
        }
        for family in [SpringFamily::Hb, SpringFamily::Mb, SpringFamily::Qz] {
            if let Some(issue) = self.base(family).and_then(SpringCurve::issue) {
                found.push(Diagnostic::OutOfRange {
                    family,
                    element: self.toe_element,
                    end: End::Bottom,
                    issue,
                });
            }
        }
        self.diagnostics.extend(found);
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Tracks enabled families a layer's model cannot produce, once per layer
#[derive(Default)]
struct Unsupported {
    seen: BTreeSet<(usize, SpringFamily)>,
    diagnostics: Vec<Diagnostic>,
}

impl Unsupported {
    fn flag(&mut self, layer_index: usize, layer: &Layer, model: &str, family: SpringFamily) {
        if self.seen.insert((layer_index, family)) {
            self.diagnostics.push(Diagnostic::UnsupportedFamily {
                family,
                layer: layer.name.clone(),
                model: model.to_string(),
            });
        }
    }
}

struct Context<'a> {
    soil: &'a SoilProfile,
    config: &'a SpringConfig,
    embedment: f64,
}

impl Context<'_> {
    fn lateral_query(&self, element: &ElementProperties, layer: &Layer, end: End) -> LateralQuery {
        let (x, xg, sigma_v) = match end {
            End::Top => (element.x_top, element.xg_top, element.sigma_v_top),
            End::Bottom => (element.x_bottom, element.xg_bottom, element.sigma_v_bottom),
        };
        LateralQuery {
            sigma_v,
            depth: xg,
            layer_height: layer.thickness(),
            depth_from_top_of_layer: layer.top - x,
            diameter: element.width,
            embedment: self.embedment,
            below_water_table: self.soil.is_below_water(x),
            output_length: self.config.output_length,
        }
    }

    /// Query for the base springs: toe of the element, full profile depth
    fn base_query(&self, element: &ElementProperties, layer: &Layer) -> LateralQuery {
        LateralQuery {
            depth: self.soil.top_elevation() - self.soil.bottom_elevation(),
            ..self.lateral_query(element, layer, End::Bottom)
        }
    }

    fn axial_query(&self, element: &ElementProperties, layer: &Layer, end: End) -> AxialQuery {
        let (x, sigma_v) = match end {
            End::Top => (element.x_top, element.sigma_v_top),
            End::Bottom => (element.x_bottom, element.sigma_v_bottom),
        };
        AxialQuery {
            sigma_v,
            layer_height: layer.thickness(),
            depth_from_top_of_layer: layer.top - x,
            diameter: element.width,
            output_length: self.config.output_length,
        }
    }
}

fn both_ends(n: usize, generate: impl Fn(End) -> SpringCurve) -> ElementSprings {
    ElementSprings {
        ends: End::BOTH.map(|end| generate(end).fit(n)),
    }
}

/// Generate every configured spring of a meshed pile.
///
/// Without a soil profile all springs are zero-filled.
pub fn assemble(mesh: &Mesh, pile: &Pile, soil: Option<&SoilProfile>, config: &SpringConfig) -> PileResult<SpringSet> {
    config.validate()?;
    let n = config.output_length;
    let count = mesh.len();
    let toe_element = count.saturating_sub(1);

    let mut set = SpringSet {
        py: vec![ElementSprings::zeros(n); count],
        mt: vec![ElementSprings::zeros(n); count],
        tz: vec![ElementSprings::zeros(n); count],
        hb: SpringCurve::zeros(n),
        mb: SpringCurve::zeros(n),
        qz: SpringCurve::zeros(n),
        toe_element,
        diagnostics: Vec::new(),
    };

    let Some(soil) = soil else {
        return Ok(set);
    };

    let context = Context {
        soil,
        config,
        embedment: (pile.top_elevation().min(soil.top_elevation()) - pile.bottom_elevation()).max(0.0),
    };
    let mut unsupported = Unsupported::default();

    for element in mesh.elements() {
        let Some(layer_index) = element.layer_index else {
            continue;
        };
        let layer = &soil.layers()[layer_index];
        let is_toe = element.index == toe_element;

        if let Some(lateral) = &layer.lateral_model {
            let model: &dyn LateralModel = lateral.as_model();
            let support = model.spring_support();
            let name = model.name();
            let query = |end| context.lateral_query(element, layer, end);

            if config.distributed_lateral {
                if support.py {
                    set.py[element.index] = both_ends(n, |end| model.py(&query(end)));
                } else {
                    unsupported.flag(layer_index, layer, name, SpringFamily::Py);
                }
            }
            if config.distributed_moment {
                if support.mt {
                    set.mt[element.index] = both_ends(n, |end| model.mt(&query(end)));
                } else {
                    unsupported.flag(layer_index, layer, name, SpringFamily::Mt);
                }
            }
            if is_toe && config.base_shear {
                if support.hb {
                    set.hb = model.hb(&context.base_query(element, layer)).fit(n);
                } else {
                    unsupported.flag(layer_index, layer, name, SpringFamily::Hb);
                }
            }
            if is_toe && config.base_moment {
                if support.mb {
                    set.mb = model.mb(&context.base_query(element, layer)).fit(n);
                } else {
                    unsupported.flag(layer_index, layer, name, SpringFamily::Mb);
                }
            }
        }

        if let Some(axial) = &layer.axial_model {
            let model = axial.as_model();
            if config.distributed_axial {
                set.tz[element.index] = both_ends(n, |end| model.tz(&context.axial_query(element, layer, end)));
            }
            if is_toe && config.base_axial {
                set.qz = model.qz(&context.axial_query(element, layer, End::Bottom)).fit(n);
            }
        }
    }

    set.diagnostics = unsupported.diagnostics;
    set.scan();
    Ok(set)
}
