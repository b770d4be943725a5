//! reporter.rs - Turns a confirmed candidate into an `Opportunity`

use crate::models::{Candidate, Opportunity, ValidatedOpportunity};

pub struct OpportunityReporter;

impl OpportunityReporter {
    /// Volume and profit ratio from the fresh books of a confirmed candidate.
    ///
    /// The tradeable volume is bounded by legs 1 and 2 only; leg 3's volume
    /// is recorded but does not constrain it yet.
    pub fn report(validated: &ValidatedOpportunity, candidate: &Candidate) -> Opportunity {
        let [market1, market2, market3] = &validated.books;

        // Buy the coin at the ask, sell it at the bid on the other market
        let market1_volume = market1.best_ask.base_volume;
        let market2_volume = market2.best_bid.base_volume;
        let market3_volume = if candidate.ratio_reversed {
            market3.best_ask.base_volume
        } else {
            market3.best_bid.base_volume
        };

        // TODO: bound by market3_volume once its conversion into leg 1 units is settled
        let tradeable_volume = market1_volume.min(market2_volume);

        Opportunity {
            market1: candidate.market1(),
            market2: candidate.market2(),
            market3: candidate.market3(),
            route: candidate.route(),
            cmp_val: validated.cmp_val,
            buy: validated.buy,
            profit_ratio: validated.profit_ratio,
            market1_volume,
            market2_volume,
            market3_volume,
            tradeable_volume,
            timestamp: chrono::Utc::now(),
        }
    }
}
