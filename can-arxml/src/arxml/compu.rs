//! COMPU-METHOD interpretation
//!
//! Supported categories:
//!
//! * `LINEAR`: a single rational scale, `phys = (n0 + n1 * raw) / d`
//! * `TEXTTABLE`: value table, raw and physical values are identical
//! * `SCALE_LINEAR_AND_TEXTTABLE`: a mix of both, one scale per range
//!
//! Missing compu methods and missing categories mean identity scaling; other
//! categories are reported and treated as identity as well.

use crate::arxml::locate::PathAtom;
use crate::arxml::schema;
use crate::arxml::system::SystemLoader;
use crate::arxml::xml;
use crate::database::{Choices, Comments, ExactScaling, NamedValue};
use crate::numeric::{self, Rational};
use crate::types::{ArxmlError, Result};
use roxmltree::Node;

/// Unit display names that mean "no unit"
const IGNORED_UNITS: &[&str] = &["NoUnit"];

/// Result of interpreting a compu method
#[derive(Debug, Clone, PartialEq)]
pub struct Scaling {
    pub exact: ExactScaling,
    /// Minimum physical value
    pub minimum: Option<f64>,
    /// Maximum physical value
    pub maximum: Option<f64>,
    pub choices: Option<Choices>,
}

impl Scaling {
    pub fn identity() -> Self {
        Self {
            exact: ExactScaling::identity(),
            minimum: None,
            maximum: None,
            choices: None,
        }
    }
}

impl Default for Scaling {
    fn default() -> Self {
        Self::identity()
    }
}

/// Everything a SYSTEM-SIGNAL contributes to a signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSignalProperties {
    pub scaling: Scaling,
    pub unit: Option<String>,
    pub comments: Option<Comments>,
}

impl<'a, 'input> SystemLoader<'a, 'input> {
    pub(crate) fn load_system_signal(&self, system_signal: Node<'a, 'input>, is_float: bool) -> Result<SystemSignalProperties> {
        let locator = self.locator();
        let compu_method = locator.unique(system_signal, self.paths.compu_method)?;

        let unit = self.load_unit(system_signal, compu_method)?;
        let comments = self.load_comments(system_signal)?;

        let scaling = match compu_method {
            Some(compu_method) => self.interpret_compu_method(compu_method, is_float)?,
            None => Scaling::identity(),
        };

        Ok(SystemSignalProperties {
            scaling,
            unit,
            comments,
        })
    }

    fn load_unit(&self, system_signal: Node<'a, 'input>, compu_method: Option<Node<'a, 'input>>) -> Result<Option<String>> {
        let locator = self.locator();

        let mut unit = locator.unique_text(system_signal, schema::SYSTEM_SIGNAL_UNIT)?;
        if unit.is_none() {
            if let Some(compu_method) = compu_method {
                unit = locator.unique_text(compu_method, schema::COMPU_METHOD_UNIT)?;
            }
        }

        Ok(unit
            .filter(|u| !u.is_empty() && !IGNORED_UNITS.contains(u))
            .map(str::to_string))
    }

    /// Scale, offset, limits and value table of a compu method
    pub(crate) fn interpret_compu_method(&self, compu_method: Node<'a, 'input>, is_float: bool) -> Result<Scaling> {
        let Some(category) = self.locator().unique_text(compu_method, &[PathAtom::one("CATEGORY")])? else {
            return Ok(Scaling::identity());
        };

        match category {
            "TEXTTABLE" => self.load_texttable(compu_method, is_float),
            "LINEAR" => self.load_linear(compu_method),
            "SCALE_LINEAR_AND_TEXTTABLE" => self.load_scale_linear_and_texttable(compu_method),
            other => {
                log::warn!(
                    "Compu method category {} of '{}' is not supported, assuming identity scaling",
                    other,
                    self.index.path_of(compu_method).unwrap_or("")
                );
                Ok(Scaling::identity())
            }
        }
    }

    fn load_texttable(&self, compu_method: Node<'a, 'input>, is_float: bool) -> Result<Scaling> {
        let locator = self.locator();
        let parse_limit = |text: &str| if is_float { numeric::parse_float(text) } else { numeric::parse_number(text) };

        let mut minimum: Option<f64> = None;
        let mut maximum: Option<f64> = None;
        let mut choices = Choices::new();

        for compu_scale in locator.children(&[compu_method], schema::COMPU_SCALES)? {
            let lower = locator.unique_text(compu_scale, &[PathAtom::one("LOWER-LIMIT")])?;
            let upper = locator.unique_text(compu_scale, &[PathAtom::one("UPPER-LIMIT")])?;
            let label = locator.unique_text(compu_scale, schema::COMPU_CONST_TEXT)?;

            // raw and physical values coincide for value tables
            if let Some(lower) = lower {
                let value = parse_limit(lower)?;
                minimum = Some(minimum.map_or(value, |m| m.min(value)));
            }
            if let Some(upper) = upper {
                let value = parse_limit(upper)?;
                maximum = Some(maximum.map_or(value, |m| m.max(value)));
            }

            if let Some(label) = label {
                let lower = lower.ok_or_else(|| {
                    ArxmlError::MissingElement(format!(
                        "LOWER-LIMIT of value table entry '{}' in '{}'",
                        label,
                        self.index.path_of(compu_scale).unwrap_or("")
                    ))
                })?;
                let value = choice_key(lower)?;
                let comments = self.load_comments(compu_scale)?;
                choices.insert(value, NamedValue::new(value, label).with_comments(comments));
            }
        }

        Ok(Scaling {
            minimum,
            maximum,
            choices: Some(choices),
            ..Scaling::identity()
        })
    }

    fn load_linear(&self, compu_method: Node<'a, 'input>) -> Result<Scaling> {
        let locator = self.locator();

        let compu_scale = locator.unique(compu_method, schema::LINEAR_COMPU_SCALE)?.ok_or_else(|| {
            ArxmlError::MissingElement(format!(
                "COMPU-SCALE of linear compu method '{}'",
                self.index.path_of(compu_method).unwrap_or("")
            ))
        })?;

        let lower = locator
            .unique_text(compu_scale, &[PathAtom::one_ref("LOWER-LIMIT")])?
            .map(numeric::parse_number)
            .transpose()?;
        let upper = locator
            .unique_text(compu_scale, &[PathAtom::one_ref("UPPER-LIMIT")])?
            .map(numeric::parse_number)
            .transpose()?;

        let exact = self
            .rational_coefficients(compu_scale)?
            .unwrap_or_else(ExactScaling::identity);
        let minimum = lower.map(|raw| project(raw, &exact));
        let maximum = upper.map(|raw| project(raw, &exact));

        Ok(Scaling {
            exact,
            minimum,
            maximum,
            choices: None,
        })
    }

    fn load_scale_linear_and_texttable(&self, compu_method: Node<'a, 'input>) -> Result<Scaling> {
        let locator = self.locator();

        let mut exact = ExactScaling::identity();
        let mut minimum: Option<f64> = None;
        let mut maximum: Option<f64> = None;
        let mut choices = Choices::new();

        for compu_scale in locator.children(&[compu_method], schema::COMPU_SCALES)? {
            let lower = locator.unique_text(compu_scale, &[PathAtom::one("LOWER-LIMIT")])?;
            let upper = locator.unique_text(compu_scale, &[PathAtom::one("UPPER-LIMIT")])?;
            let label = locator.unique_text(compu_scale, schema::COMPU_CONST_TEXT)?;

            let lower_raw = lower.map(numeric::parse_number).transpose()?;
            let upper_raw = upper.map(numeric::parse_number).transpose()?;

            // the last linear scale determines the signal's scale and offset
            let fit = self.rational_coefficients(compu_scale)?;
            let scale_fit = fit.clone().unwrap_or_else(ExactScaling::identity);
            if let Some(fit) = fit {
                exact = fit;
            }

            if let Some(raw) = lower_raw {
                let value = project(raw, &scale_fit);
                minimum = Some(minimum.map_or(value, |m| m.min(value)));
            }
            if let Some(raw) = upper_raw {
                let value = project(raw, &scale_fit);
                maximum = Some(maximum.map_or(value, |m| m.max(value)));
            }

            if let Some(label) = label {
                let (Some(lower), Some(lower_raw), Some(upper_raw)) = (lower, lower_raw, upper_raw) else {
                    return Err(ArxmlError::MalformedDocument(format!(
                        "value table entry '{}' in '{}' needs both limits",
                        label,
                        self.index.path_of(compu_scale).unwrap_or("")
                    )));
                };
                if lower_raw != upper_raw {
                    return Err(ArxmlError::MalformedDocument(format!(
                        "value table entry '{}' in '{}' spans a range",
                        label,
                        self.index.path_of(compu_scale).unwrap_or("")
                    )));
                }
                let value = choice_key(lower)?;
                let comments = self.load_comments(compu_scale)?;
                choices.insert(value, NamedValue::new(value, label).with_comments(comments));
            }
        }

        Ok(Scaling {
            exact,
            minimum,
            maximum,
            choices: Some(choices),
        })
    }

    /// `COMPU-RATIONAL-COEFFS` of a compu scale as exact scale and offset
    fn rational_coefficients(&self, compu_scale: Node<'a, 'input>) -> Result<Option<ExactScaling>> {
        let locator = self.locator();

        let Some(coeffs) = locator.unique(compu_scale, schema::COMPU_RATIONAL_COEFFS)? else {
            return Ok(None);
        };

        let numerators = locator.children(&[coeffs], schema::COMPU_NUMERATOR)?;
        if numerators.len() != 2 {
            return Err(ArxmlError::MalformedDocument(format!(
                "expected 2 numerator values for linear scaling, but got {}",
                numerators.len()
            )));
        }

        let denominators = locator.children(&[coeffs], schema::COMPU_DENOMINATOR)?;
        if denominators.len() != 1 {
            return Err(ArxmlError::MalformedDocument(format!(
                "expected 1 denominator value for linear scaling, but got {}",
                denominators.len()
            )));
        }

        let denominator_text = xml::text(denominators[0]);
        let denominator = Rational::parse_decimal(denominator_text)?;
        let divide = |numerator: Node<'a, 'input>| -> Result<Rational> {
            Rational::parse_decimal(xml::text(numerator))?
                .checked_div(&denominator)
                .ok_or_else(|| ArxmlError::InvalidNumber(denominator_text.to_string()))
        };

        Ok(Some(ExactScaling {
            offset: divide(numerators[0])?,
            scale: divide(numerators[1])?,
        }))
    }
}

/// Raw value → physical value
fn project(raw: f64, scaling: &ExactScaling) -> f64 {
    raw * scaling.scale.to_f64() + scaling.offset.to_f64()
}

/// Value table key: an integer, or a float that holds an integral value
fn choice_key(text: &str) -> Result<i64> {
    if let Ok(value) = numeric::parse_int(text) {
        return Ok(value);
    }
    let value = numeric::parse_float(text)?;
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(ArxmlError::InvalidNumber(text.trim().to_string()))
    }
}
