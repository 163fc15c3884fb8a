//! Active-section lookup against the playback position.

use super::{AnimationPlan, MotionStyle};
use crate::color::Rgb;

/// Spike amount used outside every section
const FALLBACK_SPIKE: f32 = 0.0;
/// Noise amount used outside every section
const FALLBACK_NOISE: f32 = 1.0;

/// Where the authored parameters came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSource {
    /// Index into the plan's sections
    Section(usize),
    /// Plan-level defaults (gap, or before the first section)
    Global,
}

/// Parameters authored for the current moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthoredParams<'a> {
    pub energy: f32,
    pub tension: f32,
    pub spike_amount: f32,
    pub noise_amount: f32,
    pub motion_style: MotionStyle,
    pub palette: &'a [Rgb],
    pub source: IntentSource,
}

/// Stateless section resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentResolver;

impl IntentResolver {
    /// Resolve authored parameters at playback time `t`
    ///
    /// Returns `None` when there is no plan at all. Sections are half-open
    /// `[start, end)` except the last, which also owns `t == end` so the end
    /// of the track never falls in a gap.
    pub fn resolve<'a>(&self, plan: Option<&'a AnimationPlan>, t: f64) -> Option<AuthoredParams<'a>> {
        let plan = plan?;
        let last = plan.sections.len().checked_sub(1);

        let hit = plan.sections.iter().enumerate().find(|(i, s)| {
            let inside = s.start_time <= t && t < s.end_time;
            inside || (Some(*i) == last && t == s.end_time)
        });

        Some(match hit {
            Some((index, section)) => AuthoredParams {
                energy: section.energy,
                tension: section.tension,
                spike_amount: section.spike_amount,
                noise_amount: section.noise_amount,
                motion_style: MotionStyle::from_tag(&section.motion_style),
                palette: &section.color_palette,
                source: IntentSource::Section(index),
            },
            None => AuthoredParams {
                energy: plan.global.base_energy,
                tension: plan.global.base_tension,
                spike_amount: FALLBACK_SPIKE,
                noise_amount: FALLBACK_NOISE,
                motion_style: MotionStyle::Default,
                palette: &plan.global.color_palette,
                source: IntentSource::Global,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{AnimationSection, GlobalIntent};

    fn section(name: &str, start: f64, end: f64, energy: f32) -> AnimationSection {
        AnimationSection {
            name: name.to_string(),
            start_time: start,
            end_time: end,
            energy,
            tension: 0.5,
            motion_style: "Slow".to_string(),
            spike_amount: 0.4,
            noise_amount: 0.3,
            color_palette: vec![Rgb::BLACK],
        }
    }

    fn plan(sections: Vec<AnimationSection>) -> AnimationPlan {
        AnimationPlan {
            overall_mood: "test".to_string(),
            global: GlobalIntent {
                base_energy: 0.25,
                base_tension: 0.75,
                color_palette: vec![Rgb::WHITE],
            },
            sections,
        }
    }

    fn source_at(plan: &AnimationPlan, t: f64) -> IntentSource {
        IntentResolver.resolve(Some(plan), t).unwrap().source
    }

    #[test]
    fn test_section_boundaries() {
        let p = plan(vec![section("A", 0.0, 10.0, 0.1), section("B", 10.0, 20.0, 0.9)]);
        assert_eq!(source_at(&p, 9.999), IntentSource::Section(0));
        assert_eq!(source_at(&p, 10.0), IntentSource::Section(1));
        assert_eq!(source_at(&p, 20.0), IntentSource::Section(1));
        assert_eq!(source_at(&p, 20.001), IntentSource::Global);
    }

    #[test]
    fn test_gap_falls_back_to_global() {
        let p = plan(vec![section("A", 0.0, 5.0, 0.1), section("B", 15.0, 30.0, 0.9)]);
        let params = IntentResolver.resolve(Some(&p), 12.0).unwrap();
        assert_eq!(params.source, IntentSource::Global);
        assert_eq!(params.energy, 0.25);
        assert_eq!(params.tension, 0.75);
        assert_eq!(params.spike_amount, 0.0);
        assert_eq!(params.noise_amount, 1.0);
        assert_eq!(params.motion_style, MotionStyle::Default);
        assert_eq!(params.palette, &[Rgb::WHITE]);
    }

    #[test]
    fn test_non_last_end_is_exclusive() {
        // Gap directly after A: A's end is not inclusive
        let p = plan(vec![section("A", 0.0, 5.0, 0.1), section("B", 15.0, 30.0, 0.9)]);
        assert_eq!(source_at(&p, 5.0), IntentSource::Global);
    }

    #[test]
    fn test_before_first_section_is_global() {
        let p = plan(vec![section("A", 2.0, 5.0, 0.1)]);
        assert_eq!(source_at(&p, 1.0), IntentSource::Global);
    }

    #[test]
    fn test_section_values_flow_through() {
        let p = plan(vec![section("A", 0.0, 10.0, 0.6)]);
        let params = IntentResolver.resolve(Some(&p), 3.0).unwrap();
        assert_eq!(params.energy, 0.6);
        assert_eq!(params.spike_amount, 0.4);
        assert_eq!(params.noise_amount, 0.3);
        assert_eq!(params.motion_style, MotionStyle::Slow);
        assert_eq!(params.palette, &[Rgb::BLACK]);
    }

    #[test]
    fn test_no_plan_is_none() {
        assert!(IntentResolver.resolve(None, 3.0).is_none());
    }

    #[test]
    fn test_empty_plan_is_global() {
        let p = plan(Vec::new());
        assert_eq!(source_at(&p, 0.0), IntentSource::Global);
    }
}
