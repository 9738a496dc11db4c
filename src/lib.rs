pub mod enrich;
pub mod head_to_head;
pub mod odds_profile;
pub mod player_stats;
pub mod raw_csv;
pub mod win_tally;
