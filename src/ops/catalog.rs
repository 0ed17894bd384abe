//! Operation lookup and parsing
//!
//! Textual operation specs look like `grayscale`, `brightness=50`,
//! `contrast=1.5`, `scale=150`, `translate=10,-5` or `rotate=45`.

use std::str::FromStr;

use super::control::{Control, ControlValue};
use super::filters::Filter;
use super::Kernel;
use crate::error::{Result, StrataError};

/// A parsed operation, either a fixed filter or a control value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationSpec {
    Filter(Filter),
    Control(ControlValue),
}

impl OperationSpec {
    /// Name the resulting layer would get
    pub fn layer_name(&self) -> String {
        match self {
            OperationSpec::Filter(f) => f.label().to_string(),
            OperationSpec::Control(v) => v.layer_name(),
        }
    }

    /// Bind into a kernel
    pub fn kernel(&self) -> Box<dyn Kernel> {
        match self {
            OperationSpec::Filter(f) => Box::new(*f),
            OperationSpec::Control(v) => v.kernel(),
        }
    }
}

impl FromStr for OperationSpec {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        parse_operation(s)
    }
}

/// One row of the catalog listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub label: &'static str,
    /// `None` for fixed filters, the accepted range for controls
    pub range: Option<&'static str>,
}

/// Every operation the catalog offers
pub fn catalog() -> Vec<CatalogEntry> {
    let filters = Filter::ALL.into_iter().map(|f| CatalogEntry {
        name: f.name(),
        label: f.label(),
        range: None,
    });
    let controls = Control::ALL.into_iter().map(|c| CatalogEntry {
        name: c.name(),
        label: match c {
            Control::Brightness => "Brightness",
            Control::Contrast => "Contrast",
            Control::Scale => "Scale",
            Control::Translation => "Translate",
            Control::Rotation => "Rotate",
        },
        range: Some(c.range()),
    });
    filters.chain(controls).collect()
}

/// Look up a fixed filter by name
pub fn filter_by_name(name: &str) -> Result<Filter> {
    Filter::from_name(name).ok_or_else(|| StrataError::UnknownOperation {
        name: name.to_string(),
    })
}

/// Parse `name` or `name=value[,value]`
///
/// Control values are clamped into their slider range.
pub fn parse_operation(spec: &str) -> Result<OperationSpec> {
    let (name, arg) = match spec.split_once('=') {
        Some((n, a)) => (n.trim(), Some(a.trim())),
        None => (spec.trim(), None),
    };

    if let Some(control) = Control::from_name(name) {
        let arg = arg.ok_or_else(|| StrataError::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected {}=<value>", control.name()),
        })?;
        return Ok(OperationSpec::Control(
            parse_control_value(control, arg)?.clamped(),
        ));
    }

    let filter = filter_by_name(name)?;
    if arg.is_some() {
        return Err(StrataError::InvalidParameter {
            name: name.to_string(),
            reason: "fixed filters take no value".to_string(),
        });
    }
    Ok(OperationSpec::Filter(filter))
}

/// Parse the textual value of one control
pub fn parse_control_value(control: Control, arg: &str) -> Result<ControlValue> {
    let invalid = |reason: String| StrataError::InvalidParameter {
        name: control.name().to_string(),
        reason,
    };
    let int = |s: &str| {
        s.trim()
            .parse::<i32>()
            .map_err(|e| invalid(format!("'{}': {}", s, e)))
    };

    match control {
        Control::Brightness => Ok(ControlValue::Brightness(int(arg)?)),
        Control::Rotation => Ok(ControlValue::Rotation(int(arg)?)),
        Control::Scale => {
            let pct = arg.trim().trim_end_matches('%');
            pct.parse::<u32>()
                .map(ControlValue::Scale)
                .map_err(|e| invalid(format!("'{}': {}", arg, e)))
        }
        Control::Contrast => arg
            .trim()
            .parse::<f32>()
            .map(ControlValue::Contrast)
            .map_err(|e| invalid(format!("'{}': {}", arg, e))),
        Control::Translation => {
            let (x, y) = arg
                .split_once(',')
                .ok_or_else(|| invalid(format!("expected <x>,<y>, got '{}'", arg)))?;
            Ok(ControlValue::Translation(int(x)?, int(y)?))
        }
    }
}
