use std::time::Instant;

use crate::monitoring::domain::detection_summary::DetectionSummary;
use crate::monitoring::domain::mute_timer::MuteTimer;
use crate::monitoring::domain::risk_level::RiskLevel;

/// Outcome of evaluating one summary poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlertDecision {
    Quiet(RiskLevel),
    /// High risk while muted.
    Suppressed,
    Raise { risk_score: f64 },
}

/// Raises on every poll that reports high risk, unless muted.
pub fn evaluate(summary: &DetectionSummary, mute: &MuteTimer, now: Instant) -> AlertDecision {
    let level = summary.risk_level();
    if !level.is_alerting() {
        return AlertDecision::Quiet(level);
    }
    if mute.is_active(now) {
        AlertDecision::Suppressed
    } else {
        AlertDecision::Raise {
            risk_score: summary.risk_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn summary(risk_score: f64) -> DetectionSummary {
        DetectionSummary {
            risk_score,
            ..Default::default()
        }
    }

    #[test]
    fn test_low_risk_is_quiet() {
        let now = Instant::now();
        assert_eq!(
            evaluate(&summary(45.0), &MuteTimer::new(), now),
            AlertDecision::Quiet(RiskLevel::Moderate)
        );
    }

    #[test]
    fn test_high_risk_raises() {
        let now = Instant::now();
        assert_eq!(
            evaluate(&summary(60.0), &MuteTimer::new(), now),
            AlertDecision::Raise { risk_score: 60.0 }
        );
    }

    #[test]
    fn test_high_risk_suppressed_while_muted_then_raises() {
        let now = Instant::now();
        let mut mute = MuteTimer::new();
        mute.mute(now, Duration::from_secs(300));

        assert_eq!(evaluate(&summary(80.0), &mute, now), AlertDecision::Suppressed);
        assert_eq!(
            evaluate(&summary(80.0), &mute, now + Duration::from_secs(301)),
            AlertDecision::Raise { risk_score: 80.0 }
        );
    }
}
