//! Planner integration tests
//!
//! End-to-end scenarios through the public `PlaybackPlanner` API.

mod common;

use std::sync::Arc;

use common::{media, query, TestHarness};
use pp_core::{AudioStream, Error, Server};
use pp_plan::memory::MemoryServer;
use pp_plan::{PartStream, PlanRequest};

#[test]
fn test_single_part_direct_play() {
    let harness = TestHarness::new(media(1, 600_000)).direct_playable(true);
    let mut planner = harness.planner();

    let head = planner.build(&PlanRequest::new()).unwrap();
    assert!(!head.is_transcoded());
    assert_eq!(head.start_offset(), 0);
    assert_eq!(head.play_start, Some(0));
    assert!(!head.is_live());
    assert_eq!(
        head.stream_urls(),
        vec!["http://10.0.0.5:32400/library/parts/100/file.mkv?X-Plex-Token=secret"]
    );
    assert!(head.requires_token());
}

#[test]
fn test_single_part_mkv_transcode_stereo() {
    let mut harness = TestHarness::new(media(1, 600_000)).direct_playable(false);
    harness.config.preferences.transcode_format = "mkv".into();
    harness.choice.audio_stream = Some(AudioStream {
        codec: Some("aac".into()),
        channels: Some(2),
        sampling_rate: Some(48_000),
        ..AudioStream::default()
    });
    let mut planner = harness.planner();

    let head = planner.build(&PlanRequest::new()).unwrap();
    assert!(head.is_transcoded());
    let url = head.stream_urls()[0];
    assert!(url.contains("/video/:/transcode/universal/start.mkv"));

    let params = query(url);
    assert_eq!(params["protocol"], "http");
    assert_eq!(params["copyts"], "1");
    assert_eq!(params["session"], "test-client");
    assert!(!url.contains("audioCodec%3Dac3"));
    assert!(!params.contains_key("X-Plex-Client-Profile-Extra"));
}

#[test]
fn test_seek_into_third_part() {
    let harness = TestHarness::new(media(3, 100_000)).direct_playable(true);
    let mut planner = harness.planner();

    let head = planner.build(&PlanRequest::new().seek_ms(250_000)).unwrap();
    assert_eq!(head.part_index(), 2);
    assert_eq!(head.start_offset(), 200);
    assert_eq!(head.play_start, Some(50));
}

#[test]
fn test_start_offsets_are_multiples_of_duration() {
    for count in 1..6 {
        let harness = TestHarness::new(media(count, 45_000)).direct_playable(true);
        let mut planner = harness.planner();
        planner.build(&PlanRequest::new()).unwrap();

        let offsets: Vec<u64> = planner.chain().iter().map(|d| d.start_offset()).collect();
        let expected: Vec<u64> = (0..count as u64).map(|i| i * 45).collect();
        assert_eq!(offsets, expected);
    }
}

#[test]
fn test_zero_duration_part_does_not_shift_offsets() {
    let mut m = media(4, 100_000);
    m.parts[1].duration_ms = Some(0);
    let harness = TestHarness::new(m).direct_playable(true);
    let mut planner = harness.planner();
    planner.build(&PlanRequest::new()).unwrap();

    let offsets: Vec<u64> = planner.chain().iter().map(|d| d.start_offset()).collect();
    assert_eq!(offsets, vec![0, 100, 100, 200]);
}

#[test]
fn test_build_is_idempotent() {
    let mut harness = TestHarness::new(media(3, 100_000)).direct_playable(false);
    harness.config.preferences.transcode_format = "mkv".into();
    let mut planner = harness.planner();
    let request = PlanRequest::new().seek_ms(150_000).current_part(0);

    planner.build(&request).unwrap();
    let first: Vec<_> = planner.chain().iter().cloned().collect();
    planner.build(&request).unwrap();
    let second: Vec<_> = planner.chain().iter().cloned().collect();
    assert_eq!(first, second);
}

#[test]
fn test_missing_transcode_server_returns_error() {
    let relay: Arc<dyn Server> =
        Arc::new(MemoryServer::new("plex.tv", "https://plex.tv").as_relay());
    let harness = TestHarness::new(media(1, 600_000))
        .direct_playable(false)
        .server(Some(relay));
    let mut planner = harness.planner();

    let err = planner.build(&PlanRequest::new()).unwrap_err();
    assert!(matches!(err, Error::NoTranscodeServer { .. }));
    assert!(planner.active().is_none());
}

#[test]
fn test_hls_transcode_never_sends_offset() {
    let harness = TestHarness::new(media(2, 100_000)).direct_playable(false);
    let mut planner = harness.planner();

    for seek in [0, 5_000, 50_000, 150_000] {
        planner
            .build(&PlanRequest::new().seek_ms(seek).current_part(0))
            .unwrap();
        for descriptor in planner.chain().iter() {
            let params = query(descriptor.stream_urls()[0]);
            assert_eq!(params["protocol"], "hls");
            assert!(!params.contains_key("offset"));
        }
    }
}

#[test]
fn test_mkv_offset_clamp_on_current_part() {
    let mut harness = TestHarness::new(media(1, 600_000)).direct_playable(false);
    harness.config.preferences.transcode_format = "mkv".into();
    let mut planner = harness.planner();

    for (seek_ms, expected) in [(0, "0"), (12_000, "0"), (12_999, "0"), (13_000, "13"), (90_500, "90")] {
        let head = planner
            .build(&PlanRequest::new().seek_ms(seek_ms).current_part(0))
            .unwrap();
        let params = query(head.stream_urls()[0]);
        assert_eq!(params["offset"], expected, "seek {seek_ms}");
    }
}

#[test]
fn test_advance_consumes_last_part() {
    let harness = TestHarness::new(media(2, 100_000)).direct_playable(true);
    let mut planner = harness.planner();
    planner.build(&PlanRequest::new()).unwrap();

    assert!(planner.has_more_parts());
    assert!(planner.advance());
    assert!(!planner.has_more_parts());
    let active = planner.active().unwrap();
    assert_eq!(active.part_index(), 1);
    assert!(active.previous_slot().is_some());
}

#[test]
fn test_forced_transcode_without_direct_stream() {
    let harness = TestHarness::new(media(2, 100_000)).direct_playable(true);
    let mut planner = harness.planner();

    planner
        .build(
            &PlanRequest::new()
                .force_direct_play(false)
                .allow_direct_stream(false),
        )
        .unwrap();
    for descriptor in planner.chain().iter() {
        let PartStream::Transcode(stream) = &descriptor.stream else {
            panic!("expected transcode for part {}", descriptor.part_index());
        };
        let params = query(&stream.url);
        assert_eq!(params["directStream"], "0");
        assert_eq!(params["directPlay"], "0");
        assert_eq!(params["partIndex"], descriptor.part_index().to_string());
    }
}
