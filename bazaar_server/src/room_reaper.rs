use std::time::Duration;

use bazaar_engine::{db_types::DisputeId, Hub};
use log::*;
use tokio::task::JoinHandle;

/// Starts the idle room reaper. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, rooms that have had no members for at least `max_idle` are dropped from the hub. A room that
/// someone joins again in the meantime is left alone.
pub fn start_room_reaper(hub: Hub, interval: Duration, max_idle: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Idle room reaper started. Rooms idle for {}s will be dropped", max_idle.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running idle room reaper");
            let reaped = hub.reap_idle_rooms(max_idle).await;
            if !reaped.is_empty() {
                info!("🕰️ {} idle rooms dropped", reaped.len());
                debug!("🕰️ Dropped rooms: {}", room_list(&reaped));
            }
        }
    })
}

fn room_list(rooms: &[DisputeId]) -> String {
    rooms.iter().map(|id| id.as_str()).collect::<Vec<&str>>().join(", ")
}

#[cfg(test)]
mod test {
    use bazaar_engine::HubConfig;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn idle_rooms_are_reaped() {
        let hub = Hub::start(HubConfig::default());
        let room = DisputeId::from("dispute-1");
        hub.create_room(room.clone()).await;
        let reaper = start_room_reaper(hub.clone(), Duration::from_secs(10), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(hub.list_rooms().await, vec![room]);
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert!(hub.list_rooms().await.is_empty());
        reaper.abort();
    }
}
