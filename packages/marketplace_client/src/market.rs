//! Listing, offer and collection flows built on the gateways.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::gateway::{CollectionGateway, ListingView, MarketplaceGateway};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Offer expiration `days` from `now`, rounded up to the next whole second
pub fn offer_expiration(now: u64, days: f64) -> ClientResult<u64> {
    if !days.is_finite() || days <= 0.0 {
        return Err(ClientError::validation(
            "Offer duration must be a positive number of days",
        ));
    }
    let seconds = (days * SECONDS_PER_DAY).ceil();
    let too_long = || ClientError::validation("Offer duration is too long");
    // `u64::MAX as f64` rounds up to 2^64
    if seconds >= u64::MAX as f64 {
        return Err(too_long());
    }
    now.checked_add(seconds as u64).ok_or_else(too_long)
}

/// Outcome of a serial bulk run
#[derive(Debug)]
pub struct BulkReport {
    /// Items confirmed before the run ended
    pub completed: usize,
    /// Items skipped without a call
    pub skipped: usize,
    /// The failure that stopped the run, with the id it failed on
    pub failed: Option<(u64, ClientError)>,
}

impl BulkReport {
    fn new() -> Self {
        Self {
            completed: 0,
            skipped: 0,
            failed: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Buy each listing in turn at its listed price.
///
/// `progress` receives `(done, total)` after each confirmed item.
/// Listings sold by the caller are skipped. The first failure stops the run;
/// earlier purchases stay confirmed.
pub async fn bulk_buy<G>(
    gateway: &G,
    listings: &[ListingView],
    mut progress: impl FnMut(usize, usize),
) -> BulkReport
where
    G: MarketplaceGateway + ?Sized,
{
    let caller = gateway.caller().address.clone();
    let mut report = BulkReport::new();
    let total = listings.len();

    for listing in listings {
        if listing.seller == caller {
            report.skipped += 1;
            continue;
        }
        if let Err(err) = gateway.buy_nft(listing.listing_id, listing.price).await {
            warn!(listing_id = listing.listing_id, error = %err, "bulk buy stopped");
            report.failed = Some((listing.listing_id, err.into()));
            break;
        }
        report.completed += 1;
        progress(report.completed + report.skipped, total);
    }

    info!(
        completed = report.completed,
        skipped = report.skipped,
        total,
        "bulk buy finished"
    );
    report
}

/// Cancel each listing in turn
pub async fn bulk_cancel<G>(
    gateway: &G,
    listing_ids: &[u64],
    mut progress: impl FnMut(usize, usize),
) -> BulkReport
where
    G: MarketplaceGateway + ?Sized,
{
    let mut report = BulkReport::new();
    let total = listing_ids.len();

    for &listing_id in listing_ids {
        if let Err(err) = gateway.cancel_listing(listing_id).await {
            warn!(listing_id, error = %err, "bulk cancel stopped");
            report.failed = Some((listing_id, err.into()));
            break;
        }
        report.completed += 1;
        progress(report.completed, total);
    }

    info!(completed = report.completed, total, "bulk cancel finished");
    report
}

/// List each `(token_id, price)` of one collection in turn
pub async fn bulk_list<G>(
    gateway: &G,
    nft_contract: &str,
    items: &[(u32, i128)],
    mut progress: impl FnMut(usize, usize),
) -> BulkReport
where
    G: MarketplaceGateway + ?Sized,
{
    let mut report = BulkReport::new();
    let total = items.len();

    for &(token_id, price) in items {
        if price <= 0 {
            report.failed = Some((
                token_id as u64,
                ClientError::validation(format!("Price for token {token_id} must be positive")),
            ));
            break;
        }
        if let Err(err) = gateway.list_nft(nft_contract, token_id, price).await {
            warn!(token_id, error = %err, "bulk list stopped");
            report.failed = Some((token_id as u64, err.into()));
            break;
        }
        report.completed += 1;
        progress(report.completed, total);
    }

    info!(completed = report.completed, total, "bulk list finished");
    report
}

/// Aggregate view of one collection's active listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub contract: String,
    pub count: usize,
    pub floor: i128,
    pub ceiling: i128,
    pub avg: i128,
    pub seller_count: usize,
}

/// Group active listings by collection, cheapest floor first
pub fn collection_stats(listings: &[ListingView]) -> Vec<CollectionStats> {
    let mut groups: BTreeMap<&str, Vec<&ListingView>> = BTreeMap::new();
    for listing in listings.iter().filter(|l| l.active) {
        groups.entry(listing.nft_contract.as_str()).or_default().push(listing);
    }

    let mut stats: Vec<CollectionStats> = groups
        .into_iter()
        .map(|(contract, items)| {
            let total: i128 = items.iter().map(|l| l.price).sum();
            let sellers: BTreeSet<&str> = items.iter().map(|l| l.seller.as_str()).collect();
            CollectionStats {
                contract: contract.to_string(),
                count: items.len(),
                floor: items.iter().map(|l| l.price).min().unwrap_or_default(),
                ceiling: items.iter().map(|l| l.price).max().unwrap_or_default(),
                avg: total / items.len() as i128,
                seller_count: sellers.len(),
            }
        })
        .collect();
    stats.sort_by_key(|s| s.floor);
    stats
}

/// Mint `uri` to every recipient, one call for the whole list
pub async fn airdrop<G>(collection: &G, recipients: &[String], uri: &str) -> ClientResult<Vec<u32>>
where
    G: CollectionGateway + ?Sized,
{
    let token_ids = match recipients {
        [] => return Err(ClientError::validation("At least one recipient is required")),
        [single] => vec![collection.mint_item(single, uri).await?],
        many => collection.airdrop_mint(many, uri).await?,
    };
    info!(recipients = recipients.len(), ?token_ids, "airdrop minted");
    Ok(token_ids)
}
