//! Plan acceptance: strict parse, lenient repair, clamping, coverage repair.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{AnimationPlan, AnimationSection, GlobalIntent};
use crate::color::Rgb;
use crate::error::AuthoringError;
use crate::json::{extract_object, lenient_f64, lenient_str};

/// Turn a raw authoring response into an accepted plan
///
/// `duration` is the timeline's known duration; when the last section ends
/// before it, the section is stretched to cover the whole track.
pub fn accept_plan(raw: &str, duration: Option<f64>) -> Result<AnimationPlan, AuthoringError> {
    let plan = match serde_json::from_str::<AnimationPlan>(raw) {
        Ok(plan) => plan,
        Err(strict) => {
            warn!("Plan failed strict validation ({}), attempting repair", strict);
            lenient_plan(raw)?
        }
    };
    Ok(normalize_plan(plan, duration))
}

/// Clamp every field, order sections, and repair coverage
pub fn normalize_plan(mut plan: AnimationPlan, duration: Option<f64>) -> AnimationPlan {
    plan.global.base_energy = unit(plan.global.base_energy);
    plan.global.base_tension = unit(plan.global.base_tension);

    for (i, section) in plan.sections.iter_mut().enumerate() {
        if section.name.trim().is_empty() {
            section.name = format!("section {}", i + 1);
        }
        section.start_time = non_negative(section.start_time);
        section.end_time = non_negative(section.end_time);
        if section.end_time < section.start_time {
            debug!(
                "Section '{}' ends before it starts ({} < {}), collapsing",
                section.name, section.end_time, section.start_time
            );
            section.end_time = section.start_time;
        }
        section.energy = unit(section.energy);
        section.tension = unit(section.tension);
        section.spike_amount = unit(section.spike_amount);
        section.noise_amount = unit(section.noise_amount);
        for color in &mut section.color_palette {
            *color = color.clamped();
        }
    }
    for color in &mut plan.global.color_palette {
        *color = color.clamped();
    }

    // Stable, so equal starts keep authored order
    plan.sections
        .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    if let (Some(duration), Some(last)) = (duration, plan.sections.last_mut()) {
        if duration.is_finite() && last.end_time < duration {
            debug!(
                "Extending last section '{}' from {:.2}s to {:.2}s",
                last.name, last.end_time, duration
            );
            last.end_time = duration;
        }
    }

    plan
}

/// Salvage whatever plausible fields a response carries
fn lenient_plan(raw: &str) -> Result<AnimationPlan, AuthoringError> {
    let object = extract_object(raw)
        .ok_or_else(|| AuthoringError::Malformed("no JSON object in plan response".into()))?;

    let global = object.get("global").and_then(Value::as_object);
    let sections: Vec<AnimationSection> = object
        .get("sections")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| lenient_section(i, item.as_object()?))
                .collect()
        })
        .unwrap_or_default();

    if global.is_none() && sections.is_empty() {
        return Err(AuthoringError::Rejected(
            "plan has neither sections nor global defaults".into(),
        ));
    }

    let defaults = GlobalIntent::default();
    let global = match global {
        Some(g) => GlobalIntent {
            base_energy: lenient_f64(g, &["baseEnergy", "energy"])
                .map_or(defaults.base_energy, |v| v as f32),
            base_tension: lenient_f64(g, &["baseTension", "tension"])
                .map_or(defaults.base_tension, |v| v as f32),
            color_palette: lenient_palette(g),
        },
        None => defaults,
    };

    Ok(AnimationPlan {
        overall_mood: lenient_str(&object, &["overallMood", "mood"]).unwrap_or_default(),
        global,
        sections,
    })
}

/// A section needs at least a time range; everything else defaults
fn lenient_section(index: usize, s: &Map<String, Value>) -> Option<AnimationSection> {
    let start_time = lenient_f64(s, &["startTime", "start"])?;
    let end_time = lenient_f64(s, &["endTime", "end"])?;
    let f = |keys: &[&str], default: f32| lenient_f64(s, keys).map_or(default, |v| v as f32);

    Some(AnimationSection {
        name: lenient_str(s, &["name", "label"]).unwrap_or_else(|| format!("section {}", index + 1)),
        start_time,
        end_time,
        energy: f(&["energy"], 0.5),
        tension: f(&["tension"], 0.5),
        motion_style: lenient_str(s, &["motionStyle", "style"]).unwrap_or_else(|| "default".into()),
        spike_amount: f(&["spikeAmount", "spike"], 0.0),
        noise_amount: f(&["noiseAmount", "noise"], 1.0),
        color_palette: lenient_palette(s),
    })
}

fn lenient_palette(object: &Map<String, Value>) -> Vec<Rgb> {
    object
        .get("colorPalette")
        .or_else(|| object.get("palette"))
        .and_then(Value::as_array)
        .map(|colors| colors.iter().filter_map(Rgb::from_json_lenient).collect())
        .unwrap_or_default()
}

fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRICT: &str = r##"{
        "overallMood": "melancholic",
        "global": { "baseEnergy": 0.4, "baseTension": 0.3, "colorPalette": ["#102030"] },
        "sections": [
            { "name": "intro", "startTime": 0, "endTime": 10, "energy": 0.2, "tension": 0.1,
              "motionStyle": "slow", "spikeAmount": 0.0, "noiseAmount": 0.5,
              "colorPalette": ["#000000", "#ffffff"] },
            { "name": "drop", "startTime": 10, "endTime": 20, "energy": 0.9, "tension": 0.8,
              "motionStyle": "intense", "spikeAmount": 0.7, "noiseAmount": 1.0,
              "colorPalette": ["#ff0000"] }
        ]
    }"##;

    #[test]
    fn test_strict_plan_accepted() {
        let plan = accept_plan(STRICT, None).unwrap();
        assert_eq!(plan.overall_mood, "melancholic");
        assert_eq!(plan.sections.len(), 2);
        assert_eq!(plan.sections[1].color_palette, vec![Rgb::new(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_last_section_extended_to_duration() {
        let plan = accept_plan(STRICT, Some(31.5)).unwrap();
        assert_eq!(plan.sections[1].end_time, 31.5);
        // Earlier sections untouched
        assert_eq!(plan.sections[0].end_time, 10.0);
    }

    #[test]
    fn test_longer_plan_not_shortened() {
        let plan = accept_plan(STRICT, Some(15.0)).unwrap();
        assert_eq!(plan.sections[1].end_time, 20.0);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let raw = r#"{
            "overallMood": "x",
            "global": { "baseEnergy": 3.0, "baseTension": -1.0, "colorPalette": [] },
            "sections": [
                { "name": "a", "startTime": 8, "endTime": 2, "energy": 1.5, "tension": -0.5,
                  "motionStyle": "default", "spikeAmount": 9, "noiseAmount": -2,
                  "colorPalette": [] }
            ]
        }"#;
        let plan = accept_plan(raw, None).unwrap();
        assert_eq!(plan.global.base_energy, 1.0);
        assert_eq!(plan.global.base_tension, 0.0);
        let s = &plan.sections[0];
        assert_eq!((s.energy, s.tension, s.spike_amount, s.noise_amount), (1.0, 0.0, 1.0, 0.0));
        assert_eq!(s.end_time, s.start_time);
    }

    #[test]
    fn test_lenient_repair_fills_defaults() {
        // Missing fields, string numbers, array colors, prose around the JSON
        let raw = r#"Here is your plan:
        ```json
        { "mood": "dreamy",
          "sections": [
            { "startTime": "0", "endTime": 12.5, "energy": 0.7, "palette": [[255, 0, 0]] },
            { "name": "no times" },
            { "startTime": 12.5, "endTime": 30, "motionStyle": "WILD" }
          ] }
        ```"#;
        let plan = accept_plan(raw, None).unwrap();
        assert_eq!(plan.overall_mood, "dreamy");
        assert_eq!(plan.global, GlobalIntent::default());
        assert_eq!(plan.sections.len(), 2);

        let first = &plan.sections[0];
        assert_eq!(first.name, "section 1");
        assert_eq!(first.energy, 0.7);
        assert_eq!(first.noise_amount, 1.0);
        assert_eq!(first.color_palette, vec![Rgb::new(1.0, 0.0, 0.0)]);
        assert_eq!(plan.sections[1].motion_style, "WILD");
    }

    #[test]
    fn test_sections_sorted_by_start() {
        let raw = r#"{ "sections": [
            { "name": "late", "startTime": 10, "endTime": 20 },
            { "name": "early", "startTime": 0, "endTime": 10 }
        ] }"#;
        let plan = accept_plan(raw, None).unwrap();
        assert_eq!(plan.sections[0].name, "early");
        assert_eq!(plan.sections[1].name, "late");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            accept_plan("I cannot help with that.", None),
            Err(AuthoringError::Malformed(_))
        ));
        assert!(matches!(
            accept_plan(r#"{ "sections": "none" }"#, None),
            Err(AuthoringError::Rejected(_))
        ));
    }
}
