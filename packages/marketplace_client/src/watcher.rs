//! Periodic phase recomputation for auctions shown to a user.

use std::sync::Arc;
use std::time::Duration;

use shared_utils::AuctionPhase;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::gateway::{AuctionView, MarketplaceGateway};

pub const TICK: Duration = Duration::from_secs(1);

/// Republishes an auction's phase whenever the clock moves it across a
/// deadline or settlement lands on-chain. The phase is always derived,
/// never stored.
pub struct PhaseWatcher {
    receiver: watch::Receiver<AuctionPhase>,
    handle: JoinHandle<()>,
}

impl PhaseWatcher {
    /// Start ticking every [`TICK`], refetching the auction through
    /// `gateway` on each tick. `auction` seeds the first published phase.
    ///
    /// A failed refetch keeps the last known view. The task stops once the
    /// phase reaches `Finalized` or every receiver is dropped.
    pub fn spawn<G, C>(gateway: Arc<G>, auction: AuctionView, clock: Arc<C>) -> Self
    where
        G: MarketplaceGateway + ?Sized + 'static,
        C: Clock + 'static,
    {
        let (sender, receiver) = watch::channel(auction.phase_at(clock.now()));
        let handle = tokio::spawn(async move {
            let mut auction = auction;
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                match gateway.get_blind_auction(auction.auction_id).await {
                    Ok(latest) => auction = latest,
                    Err(err) => {
                        warn!(auction_id = auction.auction_id, error = %err, "auction refresh failed")
                    }
                }
                let phase = auction.phase_at(clock.now());
                let changed = sender.send_if_modified(|current| {
                    if *current == phase {
                        false
                    } else {
                        *current = phase;
                        true
                    }
                });
                if changed {
                    debug!(auction_id = auction.auction_id, ?phase, "auction phase changed");
                }
                if phase == AuctionPhase::Finalized || sender.is_closed() {
                    break;
                }
            }
        });
        Self { receiver, handle }
    }

    pub fn current(&self) -> AuctionPhase {
        *self.receiver.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuctionPhase> {
        self.receiver.clone()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}
