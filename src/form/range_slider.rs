//! Range-slider merging
//!
//! A range is declared as two independent slider nodes sharing a
//! `sliderRangeId`, one with `sliderExtremity: down` and one with `up`. The
//! builder emits each as a [`RangeSliderHalf`]; this pass fuses every pair into
//! a single [`FieldKind::RangeSlider`] placed in the deepest group containing
//! both ends, then drops groups left empty.

use super::types::{FieldKind, FormField, FormNode, RangeEnd, RangeSliderHalf};
use crate::error::{FormError, Result};
use crate::path::ValuePath;
use crate::schema::SliderExtremity;
use crate::validation::coerce::format_f64;

/// A detached range-slider half with its field header
struct Extremity {
    title: String,
    path: ValuePath,
    description: Option<String>,
    is_readonly: bool,
    half: RangeSliderHalf,
}

/// Replace every pair of range-slider halves in `nodes` with a merged field
pub(crate) fn merge_range_sliders(nodes: &mut Vec<FormNode>) -> Result<()> {
    while let Some(down) = take_half(nodes, &|half| half.extremity == SliderExtremity::Down) {
        let range_id = down.half.range_id.clone();
        let up = take_half(nodes, &|half| {
            half.extremity == SliderExtremity::Up && half.range_id == range_id
        })
        .ok_or_else(|| FormError::RangeSliderUnpaired {
            range_id: range_id.clone(),
            path: down.path.clone(),
        })?;

        let merged = merge_pair(down, up)?;
        tracing::debug!("merged range slider '{}' at '{}'", range_id, merged.path);
        insert_at_deepest(nodes, merged);
    }

    // An `up` half whose `down` partner never showed up
    if let Some(orphan) = take_half(nodes, &|_| true) {
        return Err(FormError::RangeSliderUnpaired {
            range_id: orphan.half.range_id,
            path: orphan.path,
        });
    }
    Ok(())
}

/// Remove empty groups that cannot grow, innermost first
pub(crate) fn prune_empty_groups(nodes: &mut Vec<FormNode>) {
    nodes.retain_mut(|node| match node {
        FormNode::Field(_) => true,
        FormNode::Group(group) => {
            prune_empty_groups(&mut group.nodes);
            !group.nodes.is_empty() || group.can_add
        }
    });
}

/// Detach the first half matching `predicate`, searching depth first
fn take_half(nodes: &mut Vec<FormNode>, predicate: &dyn Fn(&RangeSliderHalf) -> bool) -> Option<Extremity> {
    let position = nodes.iter().position(|node| match node {
        FormNode::Field(FormField {
            kind: FieldKind::RangeSliderHalf(half),
            ..
        }) => predicate(half),
        _ => false,
    });
    if let Some(index) = position {
        return match nodes.remove(index) {
            FormNode::Field(FormField {
                title,
                path,
                description,
                is_readonly,
                kind: FieldKind::RangeSliderHalf(half),
            }) => Some(Extremity {
                title,
                path,
                description,
                is_readonly,
                half,
            }),
            _ => None,
        };
    }
    nodes.iter_mut().find_map(|node| match node {
        FormNode::Group(group) => take_half(&mut group.nodes, predicate),
        FormNode::Field(_) => None,
    })
}

fn merge_pair(down: Extremity, up: Extremity) -> Result<FormField> {
    let range_id = down.half.range_id;

    let unit = match (down.half.unit, up.half.unit) {
        (Some(low), Some(high)) if low != high => {
            return Err(FormError::RangeSliderUnitMismatch { range_id, low, high });
        }
        (low, high) => low.or(high),
    };

    let step = match (down.half.step, up.half.step) {
        (Some(low), Some(high)) if low != high => {
            return Err(FormError::RangeSliderStep {
                range_id,
                reason: format!("steps differ ({} and {})", format_f64(low), format_f64(high)),
            });
        }
        (Some(step), _) | (None, Some(step)) => step,
        (None, None) => {
            return Err(FormError::RangeSliderStep {
                range_id,
                reason: "neither extremity declares a sliderStep".to_string(),
            });
        }
    };

    Ok(FormField {
        title: down.title,
        path: down.path.common_prefix(&up.path),
        description: down.description,
        is_readonly: down.is_readonly || up.is_readonly,
        kind: FieldKind::RangeSlider {
            step,
            unit,
            low_end_range: RangeEnd {
                path: down.path,
                min: down.half.min,
                max: down.half.max,
                value: down.half.value,
                semantic: down.half.semantic,
            },
            high_end_range: RangeEnd {
                path: up.path,
                min: up.half.min,
                max: up.half.max,
                value: up.half.value,
                semantic: up.half.semantic,
            },
        },
    })
}

/// Append `field` to the deepest group whose path prefixes the field's path
fn insert_at_deepest(nodes: &mut Vec<FormNode>, field: FormField) {
    let children = nodes.iter_mut().find_map(|node| match node {
        FormNode::Group(group) if field.path.starts_with(&group.path) => Some(&mut group.nodes),
        _ => None,
    });
    match children {
        Some(children) => insert_at_deepest(children, field),
        None => nodes.push(FormNode::Field(field)),
    }
}
