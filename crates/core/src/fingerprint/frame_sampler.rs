/// Evenly spaced frame indices for fingerprint sampling.
///
/// The first and last `skip_fraction` of the timeline are excluded so
/// intros and outros don't pollute the fingerprint. If the usable span
/// holds fewer than `count` frames, every frame in the span is returned;
/// if the span collapses entirely (very short video), the full timeline
/// is sampled instead.
pub fn sample_indices(total_frames: usize, count: usize, skip_fraction: f64) -> Vec<usize> {
    if total_frames == 0 || count == 0 {
        return Vec::new();
    }

    let mut start = (total_frames as f64 * skip_fraction) as usize;
    let mut end = ((total_frames as f64 * (1.0 - skip_fraction)) as usize).min(total_frames);
    if end <= start {
        start = 0;
        end = total_frames;
    }

    let usable = end - start;
    if usable <= count {
        return (start..end).collect();
    }

    let step = usable as f64 / count as f64;
    (0..count)
        .map(|i| start + (i as f64 * step) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_returns_at_most_count_indices() {
        let indices = sample_indices(1000, 20, 0.10);
        assert_eq!(indices.len(), 20);
    }

    #[test]
    fn test_indices_strictly_increasing() {
        let indices = sample_indices(1000, 20, 0.10);
        for pair in indices.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_indices_respect_skip_window() {
        // 10% of 1000 → usable range [100, 900)
        let indices = sample_indices(1000, 20, 0.10);
        assert!(*indices.first().unwrap() >= 100);
        assert!(*indices.last().unwrap() < 900);
    }

    #[test]
    fn test_short_span_returns_every_frame_in_span() {
        // usable span [10, 90) holds 80 frames, fewer than 100 requested
        let indices = sample_indices(100, 100, 0.10);
        assert_eq!(indices, (10..90).collect::<Vec<_>>());
    }

    #[test]
    fn test_collapsed_span_falls_back_to_full_timeline() {
        // 3 frames with 40% skipped each side: span is empty
        let indices = sample_indices(3, 20, 0.4);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_skip_covers_whole_timeline() {
        let indices = sample_indices(100, 10, 0.0);
        assert_eq!(indices.len(), 10);
        assert_eq!(indices[0], 0);
        assert!(*indices.last().unwrap() < 100);
    }

    #[rstest]
    #[case::no_frames(0, 20, 0.1)]
    #[case::no_request(100, 0, 0.1)]
    fn test_degenerate_inputs_yield_nothing(
        #[case] total: usize,
        #[case] count: usize,
        #[case] skip: f64,
    ) {
        assert!(sample_indices(total, count, skip).is_empty());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sample_indices(777, 20, 0.10), sample_indices(777, 20, 0.10));
    }
}
