#![no_std]

use shared_utils::{
    code, AccessControl, AuctionPhase, BidCommitment, ErrorHelper, Events, SafeMath, Storage,
    TimeUtils, Validation,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, BytesN,
    Env, Symbol, Vec,
};

mod interface;
mod storage;

pub use interface::{NftClient, NftInterface};

// ============================================================================
// Error Types
// ============================================================================

/// Marketplace errors
///
/// Discriminants follow `shared_utils::error_codes`, so a failed invocation
/// can be decoded off-chain by number.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MarketplaceError {
    /// Invalid price (must be > 0)
    InvalidPrice = 1,
    /// Invalid offer or bid amount (must be > 0)
    InvalidAmount = 2,
    /// Invalid duration (must be > 0)
    InvalidDuration = 3,
    /// Offer expiration is not in the future
    InvalidExpiration = 4,
    /// Fee above 10000 basis points
    InvalidFee = 5,
    /// Not the seller
    NotSeller = 101,
    /// Seller does not own the token
    NotTokenOwner = 103,
    /// Not offer maker
    NotOfferMaker = 104,
    /// Seller cannot buy, offer on, or bid for their own item
    SelfTrade = 105,
    /// Marketplace is not approved to move the token
    NotApproved = 106,
    /// Already initialized
    AlreadyInitialized = 200,
    /// Marketplace not initialized
    NotInitialized = 201,
    /// Listing is no longer active
    ListingInactive = 202,
    /// Listing already exists for this token
    ListingExists = 203,
    /// Reentrancy detected
    ReentrancyDetected = 204,
    /// Listing is paused
    ListingPaused = 205,
    /// Listing is not paused
    ListingNotPaused = 206,
    /// Offer is no longer active
    OfferInactive = 207,
    /// Offer has expired
    OfferExpired = 208,
    /// Auction is past its commit phase
    NotCommitPhase = 209,
    /// Auction is not in its reveal phase
    NotRevealPhase = 210,
    /// Reveal phase has not ended yet
    AuctionNotEnded = 211,
    /// Auction already finalized
    AuctionFinalized = 212,
    /// Bid already revealed
    AlreadyRevealed = 213,
    /// Revealed amount and secret do not reproduce the commitment
    CommitmentMismatch = 214,
    /// Listing not found
    ListingNotFound = 300,
    /// Offer not found
    OfferNotFound = 301,
    /// Insufficient payment
    InsufficientPayment = 302,
    /// Bid below the auction minimum
    BidTooLow = 303,
    /// Auction not found
    AuctionNotFound = 304,
    /// No commitment stored for this bidder
    CommitmentNotFound = 305,
    /// Token does not exist in the collection
    TokenNotFound = 306,
    /// NFT contract call failed
    NFTContractError = 401,
}

// ============================================================================
// Data Types
// ============================================================================

/// Fixed-price listing
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    pub listing_id: u64,
    pub nft_contract: Address,
    pub token_id: u32,
    pub seller: Address,
    pub price: i128,
    pub active: bool,
    pub paused: bool,
    pub listed_at: u64,
}

/// Escrowed offer against a listing
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    pub offerer: Address,
    pub amount: i128,
    pub expiration: u64,
    pub active: bool,
}

/// Sealed-bid auction
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlindAuction {
    pub auction_id: u64,
    pub seller: Address,
    pub nft_contract: Address,
    pub token_id: u32,
    pub min_bid: i128,
    pub commit_end_time: u64,
    pub reveal_end_time: u64,
    pub finalized: bool,
    pub winner: Option<Address>,
    pub highest_bid: i128,
}

impl BlindAuction {
    pub fn phase_at(&self, now: u64) -> AuctionPhase {
        AuctionPhase::at(now, self.commit_end_time, self.reveal_end_time, self.finalized)
    }
}

/// A bidder's commitment for one auction
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SealedBid {
    pub commitment: BytesN<32>,
    pub revealed: bool,
}

/// Storage keys
#[contracttype]
pub enum DataKey {
    /// Token used for every payment and escrow
    PaymentToken,
    /// Marketplace fee (basis points, e.g., 250 = 2.5%)
    MarketplaceFee,
    /// Fee recipient address
    FeeRecipient,
    /// Last assigned listing id
    ListingCounter,
    /// Listing data (listing_id -> Listing)
    Listing(u64),
    /// Active listing of a token ((nft_contract, token_id) -> listing_id)
    TokenListing(Address, u32),
    /// Offers for a listing (listing_id -> Vec<Offer>)
    Offers(u64),
    /// Last assigned auction id
    AuctionCounter,
    /// Auction data (auction_id -> BlindAuction)
    BlindAuction(u64),
    /// Commitment of a bidder ((auction_id, bidder) -> SealedBid)
    SealedBid(u64, Address),
}


// ============================================================================
// Internal helpers
// ============================================================================

#[contract]
pub struct NftMarketplace;

impl NftMarketplace {
    /// Run `f` holding the reentrancy guard
    fn guarded<T>(
        e: &Env,
        f: impl FnOnce() -> Result<T, MarketplaceError>,
    ) -> Result<T, MarketplaceError> {
        if !Storage::enter_guard(e) {
            return Err(MarketplaceError::ReentrancyDetected);
        }
        let result = f();
        Storage::exit_guard(e);
        result
    }

    fn fail(e: &Env, context: &str, code: u32, err: MarketplaceError) -> MarketplaceError {
        ErrorHelper::fail(e, context, code, err)
    }

    fn require_owner_and_approval(
        e: &Env,
        nft_contract: &Address,
        token_id: u32,
        seller: &Address,
    ) -> Result<(), MarketplaceError> {
        let nft = NftClient::new(e, nft_contract);
        let owner = match nft.try_owner_of(&token_id) {
            Ok(Ok(owner)) => owner,
            _ => return Err(MarketplaceError::TokenNotFound),
        };
        if owner != *seller {
            return Err(Self::fail(
                e,
                "marketplace::ownership",
                code::NOT_TOKEN_OWNER,
                MarketplaceError::NotTokenOwner,
            ));
        }

        let marketplace = e.current_contract_address();
        let approved = nft.get_approved(&token_id) == Some(marketplace.clone())
            || nft.is_approved_for_all(seller, &marketplace);
        if !approved {
            return Err(Self::fail(
                e,
                "marketplace::ownership",
                code::NOT_APPROVED,
                MarketplaceError::NotApproved,
            ));
        }
        Ok(())
    }

    fn move_nft(
        e: &Env,
        nft_contract: &Address,
        from: &Address,
        to: &Address,
        token_id: u32,
    ) -> Result<(), MarketplaceError> {
        let nft = NftClient::new(e, nft_contract);
        match nft.try_transfer_from(&e.current_contract_address(), from, to, &token_id) {
            Ok(Ok(())) => Ok(()),
            _ => Err(Self::fail(
                e,
                "marketplace::move_nft",
                code::CONTRACT_CALL_FAILED,
                MarketplaceError::NFTContractError,
            )),
        }
    }

    fn pay(e: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), MarketplaceError> {
        if amount > 0 {
            let payment_token = storage::payment_token(e)?;
            token::Client::new(e, &payment_token).transfer(from, to, &amount);
            Events::emit_payment(e, from, to, amount);
        }
        Ok(())
    }

    /// Pay `amount` from `payer` to `seller`, routing the marketplace fee
    fn settle_sale(
        e: &Env,
        payer: &Address,
        seller: &Address,
        amount: i128,
    ) -> Result<(), MarketplaceError> {
        let (proceeds, fee) = SafeMath::split_fee(amount, storage::fee_bps(e));
        Self::pay(e, payer, seller, proceeds)?;
        if fee > 0 {
            let fee_recipient = storage::fee_recipient(e)?;
            Self::pay(e, payer, &fee_recipient, fee)?;
        }
        Ok(())
    }

    /// Deactivate a listing and refund every offer still escrowed against it
    fn close_listing(e: &Env, listing: &mut Listing) -> Result<(), MarketplaceError> {
        listing.active = false;
        listing.paused = false;
        storage::set_listing(e, listing);
        storage::clear_token_listing(e, &listing.nft_contract, listing.token_id);

        let escrow = e.current_contract_address();
        let mut offers = storage::get_offers(e, listing.listing_id);
        for index in 0..offers.len() {
            if let Some(mut offer) = offers.get(index) {
                if offer.active {
                    offer.active = false;
                    offers.set(index, offer.clone());
                    Self::pay(e, &escrow, &offer.offerer, offer.amount)?;
                    Events::emit_for_id(
                        e,
                        symbol_short!("OfferRfnd"),
                        listing.listing_id,
                        (index, offer.offerer, offer.amount),
                    );
                }
            }
        }
        storage::set_offers(e, listing.listing_id, &offers);
        Ok(())
    }

    /// Whether the listing's seller still holds the token
    fn seller_holds(e: &Env, listing: &Listing) -> bool {
        match NftClient::new(e, &listing.nft_contract).try_owner_of(&listing.token_id) {
            Ok(Ok(owner)) => owner == listing.seller,
            _ => false,
        }
    }

    /// Clear the way for a new listing or auction of `token_id`
    ///
    /// A listing whose seller has since transferred the token outside the
    /// marketplace is closed (refunding its offers). A listing still backed
    /// by its seller blocks with `ListingExists`.
    fn release_stale_listing(
        e: &Env,
        nft_contract: &Address,
        token_id: u32,
    ) -> Result<(), MarketplaceError> {
        let Some(listing_id) = storage::token_listing(e, nft_contract, token_id) else {
            return Ok(());
        };
        let mut listing = storage::get_listing(e, listing_id)?;
        if Self::seller_holds(e, &listing) {
            return Err(MarketplaceError::ListingExists);
        }
        Self::close_listing(e, &mut listing)?;
        Events::emit_for_id(
            e,
            symbol_short!("ListStale"),
            listing_id,
            (listing.seller, token_id),
        );
        Ok(())
    }

    fn seller_listing(
        e: &Env,
        seller: &Address,
        listing_id: u64,
    ) -> Result<Listing, MarketplaceError> {
        let listing = storage::get_listing(e, listing_id)?;
        if listing.seller != *seller {
            return Err(Self::fail(
                e,
                "marketplace::seller_listing",
                code::NOT_SELLER,
                MarketplaceError::NotSeller,
            ));
        }
        if !listing.active {
            return Err(MarketplaceError::ListingInactive);
        }
        Ok(listing)
    }
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contractimpl]
impl NftMarketplace {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the marketplace
    ///
    /// # Arguments
    /// * `admin` - Admin address
    /// * `payment_token` - Token used for prices, offers and bids
    /// * `fee_basis_points` - Marketplace fee in basis points (e.g., 250 = 2.5%)
    /// * `fee_recipient` - Address to receive marketplace fees
    pub fn initialize(
        e: Env,
        admin: Address,
        payment_token: Address,
        fee_basis_points: u32,
        fee_recipient: Address,
    ) -> Result<(), MarketplaceError> {
        if Storage::is_initialized(&e) {
            return Err(MarketplaceError::AlreadyInitialized);
        }

        admin.require_auth();
        Validation::fee_bps(fee_basis_points, MarketplaceError::InvalidFee)?;

        Storage::set_admin(&e, &admin);
        Storage::set_initialized(&e);
        e.storage().instance().set(&DataKey::PaymentToken, &payment_token);
        e.storage().instance().set(&DataKey::FeeRecipient, &fee_recipient);
        storage::set_fee_bps(&e, fee_basis_points);

        Ok(())
    }

    /// Get admin address
    pub fn get_admin(e: Env) -> Result<Address, MarketplaceError> {
        Storage::admin(&e).ok_or(MarketplaceError::NotInitialized)
    }

    /// Get the payment token address
    pub fn get_payment_token(e: Env) -> Result<Address, MarketplaceError> {
        storage::payment_token(&e)
    }

    /// Current fee in basis points
    pub fn get_fee(e: Env) -> u32 {
        storage::fee_bps(&e)
    }

    /// Update marketplace fee (admin only)
    pub fn update_fee(e: Env, fee_basis_points: u32) -> Result<(), MarketplaceError> {
        AccessControl::require_admin(&e).ok_or(MarketplaceError::NotInitialized)?;
        Validation::fee_bps(fee_basis_points, MarketplaceError::InvalidFee)?;

        storage::set_fee_bps(&e, fee_basis_points);

        e.events()
            .publish((Symbol::new(&e, "FeeUpdated"),), fee_basis_points);

        Ok(())
    }

    // ========================================================================
    // Listing Management
    // ========================================================================

    /// List an NFT for sale
    ///
    /// The seller keeps the token until it sells; the marketplace must be
    /// approved for it (single-token approval or operator).
    ///
    /// # Returns
    /// The new listing id
    pub fn list_nft(
        e: Env,
        seller: Address,
        nft_contract: Address,
        token_id: u32,
        price: i128,
    ) -> Result<u64, MarketplaceError> {
        Self::guarded(&e, || {
            seller.require_auth();

            Validation::positive(price, MarketplaceError::InvalidPrice)?;
            Self::release_stale_listing(&e, &nft_contract, token_id)?;
            Self::require_owner_and_approval(&e, &nft_contract, token_id, &seller)?;

            let listing = Listing {
                listing_id: storage::next_listing_id(&e),
                nft_contract: nft_contract.clone(),
                token_id,
                seller: seller.clone(),
                price,
                active: true,
                paused: false,
                listed_at: TimeUtils::now(&e),
            };
            storage::set_listing(&e, &listing);
            storage::set_token_listing(&e, &nft_contract, token_id, listing.listing_id);

            Events::emit_for_id(
                &e,
                symbol_short!("ListNFT"),
                listing.listing_id,
                (seller, nft_contract, token_id, price),
            );

            Ok(listing.listing_id)
        })
    }

    /// Buy a listed NFT
    ///
    /// `payment` is what the buyer offers to pay; only the listing price is
    /// charged.
    ///
    /// # Errors
    /// * `InsufficientPayment` - `payment` is below the price
    pub fn buy_nft(
        e: Env,
        buyer: Address,
        listing_id: u64,
        payment: i128,
    ) -> Result<(), MarketplaceError> {
        Self::guarded(&e, || {
            buyer.require_auth();

            let mut listing = storage::get_listing(&e, listing_id)?;
            if !listing.active {
                return Err(MarketplaceError::ListingInactive);
            }
            if listing.paused {
                return Err(MarketplaceError::ListingPaused);
            }
            if listing.seller == buyer {
                return Err(MarketplaceError::SelfTrade);
            }
            if payment < listing.price {
                return Err(Self::fail(
                    &e,
                    "marketplace::buy_nft",
                    code::INSUFFICIENT_PAYMENT,
                    MarketplaceError::InsufficientPayment,
                ));
            }

            Self::close_listing(&e, &mut listing)?;
            Self::settle_sale(&e, &buyer, &listing.seller, listing.price)?;
            Self::move_nft(
                &e,
                &listing.nft_contract,
                &listing.seller,
                &buyer,
                listing.token_id,
            )?;

            Events::emit_for_id(
                &e,
                symbol_short!("NFTSold"),
                listing_id,
                (listing.seller, buyer, listing.price),
            );

            Ok(())
        })
    }

    /// Change the price of an active listing (seller only)
    pub fn update_price(
        e: Env,
        seller: Address,
        listing_id: u64,
        new_price: i128,
    ) -> Result<(), MarketplaceError> {
        seller.require_auth();
        Validation::positive(new_price, MarketplaceError::InvalidPrice)?;

        let mut listing = Self::seller_listing(&e, &seller, listing_id)?;
        let old_price = listing.price;
        listing.price = new_price;
        storage::set_listing(&e, &listing);

        Events::emit_for_id(
            &e,
            symbol_short!("PriceUpd"),
            listing_id,
            (old_price, new_price),
        );

        Ok(())
    }

    /// Temporarily withdraw a listing from sale (seller only)
    pub fn pause_listing(e: Env, seller: Address, listing_id: u64) -> Result<(), MarketplaceError> {
        seller.require_auth();

        let mut listing = Self::seller_listing(&e, &seller, listing_id)?;
        if listing.paused {
            return Err(MarketplaceError::ListingPaused);
        }
        listing.paused = true;
        storage::set_listing(&e, &listing);

        Events::emit_for_id(&e, symbol_short!("ListPause"), listing_id, seller);

        Ok(())
    }

    /// Put a paused listing back on sale (seller only)
    pub fn resume_listing(
        e: Env,
        seller: Address,
        listing_id: u64,
    ) -> Result<(), MarketplaceError> {
        seller.require_auth();

        let mut listing = Self::seller_listing(&e, &seller, listing_id)?;
        if !listing.paused {
            return Err(MarketplaceError::ListingNotPaused);
        }
        listing.paused = false;
        storage::set_listing(&e, &listing);

        Events::emit_for_id(&e, symbol_short!("ListResum"), listing_id, seller);

        Ok(())
    }

    /// Cancel a listing (seller only); open offers are refunded
    pub fn cancel_listing(
        e: Env,
        seller: Address,
        listing_id: u64,
    ) -> Result<(), MarketplaceError> {
        Self::guarded(&e, || {
            seller.require_auth();

            let mut listing = Self::seller_listing(&e, &seller, listing_id)?;
            Self::close_listing(&e, &mut listing)?;

            Events::emit_for_id(&e, symbol_short!("ListCncl"), listing_id, seller);

            Ok(())
        })
    }

    /// Get a listing
    pub fn get_listing(e: Env, listing_id: u64) -> Result<Listing, MarketplaceError> {
        storage::get_listing(&e, listing_id)
    }

    /// Listings that can be bought right now
    ///
    /// Active, not paused, and still backed by a seller who owns the token.
    pub fn get_all_active_listings(e: Env) -> Vec<Listing> {
        let mut listings = Vec::new(&e);
        for listing in Self::get_all_listings(e.clone()).iter() {
            if listing.active && !listing.paused && Self::seller_holds(&e, &listing) {
                listings.push_back(listing);
            }
        }
        listings
    }

    /// Every listing ever created, in creation order
    pub fn get_all_listings(e: Env) -> Vec<Listing> {
        let mut listings = Vec::new(&e);
        for listing_id in 1..=storage::listing_count(&e) {
            if let Ok(listing) = storage::get_listing(&e, listing_id) {
                listings.push_back(listing);
            }
        }
        listings
    }

    // ========================================================================
    // Offer System
    // ========================================================================

    /// Make an escrowed offer on a listing
    ///
    /// # Returns
    /// The offer index within the listing
    pub fn make_offer(
        e: Env,
        offerer: Address,
        listing_id: u64,
        amount: i128,
        expiration: u64,
    ) -> Result<u32, MarketplaceError> {
        Self::guarded(&e, || {
            offerer.require_auth();

            Validation::positive(amount, MarketplaceError::InvalidAmount)?;
            Validation::in_future(expiration, TimeUtils::now(&e), MarketplaceError::InvalidExpiration)?;

            let listing = storage::get_listing(&e, listing_id)?;
            if !listing.active {
                return Err(MarketplaceError::ListingInactive);
            }
            if listing.paused {
                return Err(MarketplaceError::ListingPaused);
            }
            if listing.seller == offerer {
                return Err(MarketplaceError::SelfTrade);
            }

            Self::pay(&e, &offerer, &e.current_contract_address(), amount)?;

            let mut offers = storage::get_offers(&e, listing_id);
            let offer_index = offers.len();
            offers.push_back(Offer {
                offerer: offerer.clone(),
                amount,
                expiration,
                active: true,
            });
            storage::set_offers(&e, listing_id, &offers);

            Events::emit_for_id(
                &e,
                symbol_short!("OfferMade"),
                listing_id,
                (offer_index, offerer, amount, expiration),
            );

            Ok(offer_index)
        })
    }

    /// Accept an offer (seller only)
    ///
    /// The escrowed amount pays the seller (minus fee), the NFT moves to the
    /// offerer, the listing closes and every other open offer is refunded.
    pub fn accept_offer(
        e: Env,
        seller: Address,
        listing_id: u64,
        offer_index: u32,
    ) -> Result<(), MarketplaceError> {
        Self::guarded(&e, || {
            seller.require_auth();

            let mut listing = Self::seller_listing(&e, &seller, listing_id)?;
            let mut offers = storage::get_offers(&e, listing_id);
            let mut offer = offers
                .get(offer_index)
                .ok_or(MarketplaceError::OfferNotFound)?;
            if !offer.active {
                return Err(MarketplaceError::OfferInactive);
            }
            if TimeUtils::is_expired(&e, offer.expiration) {
                return Err(Self::fail(
                    &e,
                    "marketplace::accept_offer",
                    code::OFFER_EXPIRED,
                    MarketplaceError::OfferExpired,
                ));
            }

            offer.active = false;
            offers.set(offer_index, offer.clone());
            storage::set_offers(&e, listing_id, &offers);
            Self::close_listing(&e, &mut listing)?;

            Self::settle_sale(&e, &e.current_contract_address(), &seller, offer.amount)?;
            Self::move_nft(
                &e,
                &listing.nft_contract,
                &seller,
                &offer.offerer,
                listing.token_id,
            )?;

            Events::emit_for_id(
                &e,
                symbol_short!("OfferAcpt"),
                listing_id,
                (offer_index, offer.offerer, offer.amount),
            );

            Ok(())
        })
    }

    /// Withdraw an open offer and refund its escrow (offerer only)
    pub fn cancel_offer(
        e: Env,
        offerer: Address,
        listing_id: u64,
        offer_index: u32,
    ) -> Result<(), MarketplaceError> {
        Self::guarded(&e, || {
            offerer.require_auth();

            let mut offers = storage::get_offers(&e, listing_id);
            let mut offer = offers
                .get(offer_index)
                .ok_or(MarketplaceError::OfferNotFound)?;
            if offer.offerer != offerer {
                return Err(MarketplaceError::NotOfferMaker);
            }
            if !offer.active {
                return Err(MarketplaceError::OfferInactive);
            }

            offer.active = false;
            offers.set(offer_index, offer.clone());
            storage::set_offers(&e, listing_id, &offers);
            Self::pay(&e, &e.current_contract_address(), &offerer, offer.amount)?;

            Events::emit_for_id(
                &e,
                symbol_short!("OfferCncl"),
                listing_id,
                (offer_index, offerer, offer.amount),
            );

            Ok(())
        })
    }

    /// All offers ever made on a listing, indexed by offer index
    pub fn get_offers(e: Env, listing_id: u64) -> Vec<Offer> {
        storage::get_offers(&e, listing_id)
    }

    // ========================================================================
    // Blind Auctions
    // ========================================================================

    /// Start a sealed-bid auction; the NFT moves into marketplace custody
    ///
    /// # Arguments
    /// * `commit_seconds` - Length of the commit phase
    /// * `reveal_seconds` - Length of the reveal phase
    ///
    /// # Returns
    /// The new auction id
    pub fn create_blind_auction(
        e: Env,
        seller: Address,
        nft_contract: Address,
        token_id: u32,
        min_bid: i128,
        commit_seconds: u64,
        reveal_seconds: u64,
    ) -> Result<u64, MarketplaceError> {
        Self::guarded(&e, || {
            seller.require_auth();

            Validation::positive(min_bid, MarketplaceError::InvalidAmount)?;
            Validation::non_zero_duration(commit_seconds, MarketplaceError::InvalidDuration)?;
            Validation::non_zero_duration(reveal_seconds, MarketplaceError::InvalidDuration)?;
            Self::release_stale_listing(&e, &nft_contract, token_id)?;
            Self::require_owner_and_approval(&e, &nft_contract, token_id, &seller)?;

            let now = TimeUtils::now(&e);
            let commit_end_time = TimeUtils::deadline(now, commit_seconds);
            let auction = BlindAuction {
                auction_id: storage::next_auction_id(&e),
                seller: seller.clone(),
                nft_contract: nft_contract.clone(),
                token_id,
                min_bid,
                commit_end_time,
                reveal_end_time: TimeUtils::deadline(commit_end_time, reveal_seconds),
                finalized: false,
                winner: None,
                highest_bid: 0,
            };
            storage::set_auction(&e, &auction);

            Self::move_nft(
                &e,
                &nft_contract,
                &seller,
                &e.current_contract_address(),
                token_id,
            )?;

            Events::emit_for_id(
                &e,
                symbol_short!("BAuction"),
                auction.auction_id,
                (
                    seller,
                    nft_contract,
                    token_id,
                    min_bid,
                    auction.commit_end_time,
                    auction.reveal_end_time,
                ),
            );

            Ok(auction.auction_id)
        })
    }

    /// Submit (or replace) a sealed commitment during the commit phase
    ///
    /// No funds move until the reveal.
    pub fn commit_blind_bid(
        e: Env,
        bidder: Address,
        auction_id: u64,
        commitment: BytesN<32>,
    ) -> Result<(), MarketplaceError> {
        bidder.require_auth();

        let auction = storage::get_auction(&e, auction_id)?;
        if !auction.phase_at(TimeUtils::now(&e)).accepts_commitments() {
            return Err(Self::fail(
                &e,
                "marketplace::commit_blind_bid",
                code::NOT_COMMIT_PHASE,
                MarketplaceError::NotCommitPhase,
            ));
        }
        if auction.seller == bidder {
            return Err(MarketplaceError::SelfTrade);
        }

        storage::set_sealed_bid(
            &e,
            auction_id,
            &bidder,
            &SealedBid {
                commitment: commitment.clone(),
                revealed: false,
            },
        );

        Events::emit_for_id(
            &e,
            symbol_short!("BidCommit"),
            auction_id,
            (bidder, commitment),
        );

        Ok(())
    }

    /// Open a commitment during the reveal phase and escrow the bid
    ///
    /// A strictly higher bid takes the lead and the previous leader is
    /// refunded. A bid that does not lead is refunded immediately, so ties go
    /// to whoever revealed first.
    pub fn reveal_blind_bid(
        e: Env,
        bidder: Address,
        auction_id: u64,
        amount: i128,
        secret_hash: BytesN<32>,
    ) -> Result<(), MarketplaceError> {
        Self::guarded(&e, || {
            bidder.require_auth();

            let mut auction = storage::get_auction(&e, auction_id)?;
            if !auction.phase_at(TimeUtils::now(&e)).accepts_reveals() {
                return Err(Self::fail(
                    &e,
                    "marketplace::reveal_blind_bid",
                    code::NOT_REVEAL_PHASE,
                    MarketplaceError::NotRevealPhase,
                ));
            }

            let mut sealed = storage::get_sealed_bid(&e, auction_id, &bidder)
                .ok_or(MarketplaceError::CommitmentNotFound)?;
            if sealed.revealed {
                return Err(MarketplaceError::AlreadyRevealed);
            }
            Validation::positive(amount, MarketplaceError::InvalidAmount)?;
            if !BidCommitment::matches(&e, &sealed.commitment, amount, &secret_hash, &bidder) {
                return Err(Self::fail(
                    &e,
                    "marketplace::reveal_blind_bid",
                    code::COMMITMENT_MISMATCH,
                    MarketplaceError::CommitmentMismatch,
                ));
            }
            Validation::at_least(amount, auction.min_bid, MarketplaceError::BidTooLow)?;

            sealed.revealed = true;
            storage::set_sealed_bid(&e, auction_id, &bidder, &sealed);

            let escrow = e.current_contract_address();
            Self::pay(&e, &bidder, &escrow, amount)?;

            if amount > auction.highest_bid {
                if let Some(previous) = auction.winner.clone() {
                    Self::pay(&e, &escrow, &previous, auction.highest_bid)?;
                    Events::emit_for_id(
                        &e,
                        symbol_short!("BidRefund"),
                        auction_id,
                        (previous, auction.highest_bid),
                    );
                }
                auction.winner = Some(bidder.clone());
                auction.highest_bid = amount;
                storage::set_auction(&e, &auction);
            } else {
                Self::pay(&e, &escrow, &bidder, amount)?;
                Events::emit_for_id(
                    &e,
                    symbol_short!("BidRefund"),
                    auction_id,
                    (bidder.clone(), amount),
                );
            }

            Events::emit_for_id(
                &e,
                symbol_short!("BidReveal"),
                auction_id,
                (bidder, amount),
            );

            Ok(())
        })
    }

    /// Settle an auction after its reveal phase (callable by anyone)
    ///
    /// With a winner the escrowed bid pays the seller (minus fee) and the NFT
    /// goes to the winner; without one the NFT returns to the seller.
    pub fn finalize_blind_auction(e: Env, auction_id: u64) -> Result<(), MarketplaceError> {
        Self::guarded(&e, || {
            let mut auction = storage::get_auction(&e, auction_id)?;
            let phase = auction.phase_at(TimeUtils::now(&e));
            if phase == AuctionPhase::Finalized {
                return Err(MarketplaceError::AuctionFinalized);
            }
            if !phase.can_finalize() {
                return Err(Self::fail(
                    &e,
                    "marketplace::finalize_blind_auction",
                    code::AUCTION_NOT_ENDED,
                    MarketplaceError::AuctionNotEnded,
                ));
            }

            auction.finalized = true;
            storage::set_auction(&e, &auction);

            let escrow = e.current_contract_address();
            let recipient = match auction.winner.clone() {
                Some(winner) => {
                    Self::settle_sale(&e, &escrow, &auction.seller, auction.highest_bid)?;
                    winner
                }
                None => auction.seller.clone(),
            };
            Self::move_nft(&e, &auction.nft_contract, &escrow, &recipient, auction.token_id)?;

            Events::emit_for_id(
                &e,
                symbol_short!("BAFinal"),
                auction_id,
                (auction.winner, auction.highest_bid),
            );

            Ok(())
        })
    }

    /// Get an auction
    pub fn get_blind_auction(e: Env, auction_id: u64) -> Result<BlindAuction, MarketplaceError> {
        storage::get_auction(&e, auction_id)
    }

    /// Phase of an auction at the current ledger time
    pub fn get_blind_auction_phase(
        e: Env,
        auction_id: u64,
    ) -> Result<AuctionPhase, MarketplaceError> {
        let auction = storage::get_auction(&e, auction_id)?;
        Ok(auction.phase_at(TimeUtils::now(&e)))
    }

    /// Auctions that have not been finalized yet
    pub fn get_all_active_blind_auctions(e: Env) -> Vec<BlindAuction> {
        let mut auctions = Vec::new(&e);
        for auction_id in 1..=storage::auction_count(&e) {
            if let Ok(auction) = storage::get_auction(&e, auction_id) {
                if !auction.finalized {
                    auctions.push_back(auction);
                }
            }
        }
        auctions
    }

    /// Stored commitment of `bidder` for an auction
    pub fn get_commitment(
        e: Env,
        auction_id: u64,
        bidder: Address,
    ) -> Result<SealedBid, MarketplaceError> {
        storage::get_sealed_bid(&e, auction_id, &bidder).ok_or(MarketplaceError::CommitmentNotFound)
    }
}
