use tracing::debug;

use super::query_param;
use crate::common::types::VideoId;

/// The host's interface object.
pub trait InterfaceBridge: Send + Sync {
    fn switch_watch_view_video(&self, video_id: &VideoId);
}

/// Video a covering overlay or video-wall thumbnail links to, taken from
/// the `v` parameter of its link target.
pub fn overlay_target(href: &str) -> Option<VideoId> {
    let (_, query) = href.split_once('?')?;
    query_param(query, "v")
        .filter(|v| !v.is_empty())
        .map(VideoId::from)
}

/// Forward a click on an overlay link to the host. Returns whether the
/// host was asked to switch.
pub fn redirect_overlay(bridge: &dyn InterfaceBridge, href: &str) -> bool {
    match overlay_target(href) {
        Some(video_id) => {
            debug!("overlay click switches to {}", video_id);
            bridge.switch_watch_view_video(&video_id);
            true
        }
        None => false,
    }
}
