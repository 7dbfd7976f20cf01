use std::time::Duration;

use crate::config::PlaybackConfig;
use crate::services::playback::advance::{AdvanceDetector, AdvanceSignal, progress};
use crate::services::playback::types::{
    MediaId, MediaItem, PlaybackIntent, PlaybackTarget, PlayerSnapshot, PlayerState, Volume,
};

fn item(id: &MediaId, start_secs: u64, end_secs: u64) -> MediaItem {
    MediaItem {
        id: id.clone(),
        start: Duration::from_secs(start_secs),
        end: Duration::from_secs(end_secs),
    }
}

fn snapshot(id: &MediaId, time_secs: u64, duration_secs: u64, state: PlayerState) -> PlayerSnapshot {
    PlayerSnapshot {
        current_time: Duration::from_secs(time_secs),
        duration: Duration::from_secs(duration_secs),
        current_media: id.clone(),
        state,
        volume: Volume::default(),
        muted: false,
    }
}

fn playing_intent() -> PlaybackIntent {
    PlaybackIntent {
        playing: true,
        ..Default::default()
    }
}

fn fresh_target(id: &MediaId) -> PlaybackTarget {
    PlaybackTarget::new(id.clone(), Duration::ZERO)
}

mod natural_completion {
    use super::*;

    #[test]
    fn finished_item_requests_one_advance() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("almostdone01");
        let item = item(&id, 0, 100);
        let target = PlaybackTarget::new(id.clone(), Duration::ZERO);
        let snap = snapshot(&id, 99, 100, PlayerState::Playing);

        let signal = detector.evaluate(
            Some(&item),
            Some(&target),
            &snap,
            &playing_intent(),
            false,
        );
        assert_eq!(signal, Some(AdvanceSignal::natural()));

        // Same target: already reported.
        let again = detector.evaluate(
            Some(&item),
            Some(&target),
            &snap,
            &playing_intent(),
            false,
        );
        assert_eq!(again, None);
    }

    #[test]
    fn a_new_target_rearms_the_detector() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("almostdone01");
        let item = item(&id, 0, 100);
        let snap = snapshot(&id, 99, 100, PlayerState::Playing);

        let first = fresh_target(&id);
        assert!(
            detector
                .evaluate(Some(&item), Some(&first), &snap, &playing_intent(), false)
                .is_some()
        );

        let second = fresh_target(&id);
        let signal =
            detector.evaluate(Some(&item), Some(&second), &snap, &playing_intent(), false);
        assert_eq!(signal, Some(AdvanceSignal::natural()));
    }

    #[test]
    fn targets_issued_in_the_same_instant_do_not_alias() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("almostdone01");
        let item = item(&id, 0, 100);
        let snap = snapshot(&id, 99, 100, PlayerState::Playing);

        // Identical timestamps, as a coarse or paused clock would produce.
        let first = fresh_target(&id);
        let second = PlaybackTarget {
            requested_at: first.requested_at,
            ..fresh_target(&id)
        };

        assert!(
            detector
                .evaluate(Some(&item), Some(&first), &snap, &playing_intent(), false)
                .is_some()
        );
        let signal =
            detector.evaluate(Some(&item), Some(&second), &snap, &playing_intent(), false);
        assert_eq!(signal, Some(AdvanceSignal::natural()));
    }

    #[test]
    fn mid_item_gives_no_verdict() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("halfwaydone1");
        let item = item(&id, 0, 100);
        let target = PlaybackTarget::new(id.clone(), Duration::ZERO);
        let snap = snapshot(&id, 50, 100, PlayerState::Playing);

        let signal = detector.evaluate(
            Some(&item),
            Some(&target),
            &snap,
            &playing_intent(),
            false,
        );
        assert_eq!(signal, None);
    }

    #[test]
    fn item_slice_end_counts_as_finished() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("trackslice01");
        // A 60s slice of a much longer upload.
        let item = item(&id, 30, 90);
        let target = PlaybackTarget::new(id.clone(), Duration::from_secs(30));
        let snap = snapshot(&id, 91, 3600, PlayerState::Playing);

        let signal = detector.evaluate(
            Some(&item),
            Some(&target),
            &snap,
            &playing_intent(),
            false,
        );
        assert_eq!(signal, Some(AdvanceSignal::natural()));
    }

    #[test]
    fn mismatched_media_gives_no_verdict() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("selected0001");
        let other = MediaId::new("stillloaded1");
        let item = item(&id, 0, 100);
        let target = PlaybackTarget::new(id, Duration::ZERO);
        let snap = snapshot(&other, 99, 100, PlayerState::Playing);

        let signal = detector.evaluate(
            Some(&item),
            Some(&target),
            &snap,
            &playing_intent(),
            false,
        );
        assert_eq!(signal, None);
    }

    #[test]
    fn no_selection_gives_no_verdict() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("leftover0001");
        let snap = snapshot(&id, 99, 100, PlayerState::Playing);

        let signal = detector.evaluate(None, None, &snap, &playing_intent(), false);
        assert_eq!(signal, None);
    }
}

mod error_skip {
    use super::*;

    fn broken_snapshot(id: &MediaId) -> PlayerSnapshot {
        snapshot(id, 0, 0, PlayerState::Unstarted)
    }

    #[test]
    fn unplayable_item_is_skipped_once() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("regionlocked");
        let item = item(&id, 0, 100);
        let snap = broken_snapshot(&id);

        let first = fresh_target(&id);
        let signal =
            detector.evaluate(Some(&item), Some(&first), &snap, &playing_intent(), true);
        assert_eq!(signal, Some(AdvanceSignal::error_skip()));

        // Flag still raised: the one-shot is spent, even for a new target.
        let second = fresh_target(&id);
        let again =
            detector.evaluate(Some(&item), Some(&second), &snap, &playing_intent(), true);
        assert_eq!(again, None);
    }

    #[test]
    fn clearing_the_flag_rearms_the_skip() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("regionlocked");
        let item = item(&id, 0, 100);
        let snap = broken_snapshot(&id);

        let first = fresh_target(&id);
        assert!(
            detector
                .evaluate(Some(&item), Some(&first), &snap, &playing_intent(), true)
                .is_some()
        );

        // Successful reconciliation clears the flag.
        let second = fresh_target(&id);
        assert_eq!(
            detector.evaluate(Some(&item), Some(&second), &snap, &playing_intent(), false),
            None
        );

        let third = fresh_target(&id);
        let signal =
            detector.evaluate(Some(&item), Some(&third), &snap, &playing_intent(), true);
        assert_eq!(signal, Some(AdvanceSignal::error_skip()));
    }

    #[test]
    fn paused_intent_suppresses_the_skip() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("regionlocked");
        let item = item(&id, 0, 100);
        let target = PlaybackTarget::new(id.clone(), Duration::ZERO);
        let snap = broken_snapshot(&id);

        let paused = PlaybackIntent::default();
        let signal = detector.evaluate(Some(&item), Some(&target), &snap, &paused, true);
        assert_eq!(signal, None);
    }

    #[test]
    fn stale_error_from_previous_media_does_not_skip() {
        let mut detector = AdvanceDetector::new(PlaybackConfig::default());
        let id = MediaId::new("nextitem0001");
        let previous = MediaId::new("baditem00001");
        let item = item(&id, 0, 100);
        let target = PlaybackTarget::new(id, Duration::ZERO);
        let snap = broken_snapshot(&previous);

        let signal = detector.evaluate(Some(&item), Some(&target), &snap, &playing_intent(), true);
        assert_eq!(signal, None);
    }
}

mod progress_fraction {
    use super::*;

    #[test]
    fn measures_from_the_item_start_offset() {
        let id = MediaId::new("trackslice01");
        let item = item(&id, 30, 90);
        let snap = snapshot(&id, 60, 3600, PlayerState::Playing);
        let fraction = progress(&item, &snap);
        assert!((fraction - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_length_item_is_complete() {
        let id = MediaId::new("emptyslice01");
        let item = item(&id, 30, 30);
        let snap = snapshot(&id, 0, 3600, PlayerState::Playing);
        assert!((progress(&item, &snap) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn playhead_before_the_slice_is_zero() {
        let id = MediaId::new("trackslice01");
        let item = item(&id, 30, 90);
        let snap = snapshot(&id, 10, 3600, PlayerState::Playing);
        assert!(progress(&item, &snap).abs() < f64::EPSILON);
    }
}
