//! Human-readable and JSON output for built chains.

use anyhow::Result;
use pp_plan::{PartChain, PartStream, PlaybackDescriptor};

/// One descriptor as an indented block.
pub fn descriptor_text(descriptor: &PlaybackDescriptor) -> String {
    let kind = if descriptor.is_transcoded() {
        "transcode"
    } else {
        "direct"
    };

    let mut lines = vec![
        format!(
            "Part {} [{}] {}",
            descriptor.part_index(),
            kind,
            descriptor.stream_format()
        ),
        format!("  Start offset: {}s", descriptor.start_offset()),
    ];
    if let Some(play_start) = descriptor.play_start {
        lines.push(format!("  Play start: {play_start}s"));
    }
    if descriptor.is_live() {
        lines.push("  Live: yes".to_string());
    }
    match &descriptor.stream {
        PartStream::Direct(direct) => {
            lines.push(format!("  To server: {}", direct.is_request_to_server));
            if let Some(language) = &direct.audio_language {
                lines.push(format!("  Audio: {language}"));
            }
        }
        PartStream::Transcode(transcode) => {
            lines.push(format!("  Transcoder: {}", transcode.server));
        }
    }
    if let Some(url) = &descriptor.info.subtitle_url {
        lines.push(format!("  Subtitles: {url}"));
    }
    if let Some(config) = &descriptor.info.subtitle_config {
        lines.push(format!("  Subtitle track: {}", config.track_name));
    }
    lines.extend(descriptor.stream_urls().into_iter().map(|url| format!("  URL: {url}")));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Every descriptor reachable from the head, in play order.
pub fn chain_text(chain: &PartChain) -> String {
    let mut out = format!("Parts: {}\n", chain.iter().count());
    for descriptor in chain.iter() {
        out.push('\n');
        out.push_str(&descriptor_text(descriptor));
    }
    out
}

/// Every descriptor reachable from the head as a pretty JSON array.
pub fn chain_json(chain: &PartChain) -> Result<String> {
    let descriptors: Vec<&PlaybackDescriptor> = chain.iter().collect();
    Ok(serde_json::to_string_pretty(&descriptors)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_core::{DeviceConfig, Media, Part};
    use pp_plan::memory::{MemoryDecider, MemoryServer, StaticItem};
    use pp_plan::{PlanRequest, PlaybackPlanner};
    use std::sync::Arc;

    fn planner() -> PlaybackPlanner {
        let media = Media {
            parts: vec![
                Part {
                    key: "/library/parts/1/a.mp4".into(),
                    duration_ms: Some(60_000),
                    ..Part::default()
                },
                Part {
                    key: "/library/parts/2/b.mp4".into(),
                    duration_ms: Some(60_000),
                    ..Part::default()
                },
            ],
            ..Media::default()
        };
        let server = Arc::new(MemoryServer::new("den", "http://10.0.0.5:32400"));
        let item = StaticItem::new("/library/metadata/1", media).with_server(server);
        let choice = pp_core::StreamChoice {
            is_direct_playable: true,
            ..Default::default()
        };
        PlaybackPlanner::new(
            Arc::new(item),
            choice,
            Arc::new(DeviceConfig::default()),
            Arc::new(MemoryDecider::new(true)),
        )
    }

    #[test]
    fn text_lists_parts_in_order() {
        let mut planner = planner();
        planner.build(&PlanRequest::new()).unwrap();
        let text = chain_text(planner.chain());
        assert!(text.starts_with("Parts: 2"));
        let first = text.find("Part 0 [direct] mp4").unwrap();
        let second = text.find("Part 1 [direct] mp4").unwrap();
        assert!(first < second);
        assert!(text.contains("URL: http://10.0.0.5:32400/library/parts/1/a.mp4"));
    }

    #[test]
    fn descriptor_block_is_newline_terminated() {
        let mut planner = planner();
        let head = planner.build(&PlanRequest::new()).unwrap();
        let text = descriptor_text(head);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Part 0 [direct] mp4");
        assert_eq!(lines[1], "  Start offset: 0s");
        assert_eq!(lines[2], "  Play start: 0s");
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn json_flattens_part_info() {
        let mut planner = planner();
        planner.build(&PlanRequest::new()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&chain_json(planner.chain()).unwrap()).unwrap();
        let parts = json.as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["start_offset"], 60);
        assert_eq!(parts[0]["stream"]["kind"], "direct");
        assert_eq!(parts[0]["play_start"], 0);
        assert!(parts[1]["play_start"].is_null());
    }
}
