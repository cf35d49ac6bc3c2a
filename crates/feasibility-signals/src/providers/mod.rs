pub mod lexicon;
pub mod newsapi;
pub mod yahoo;

pub use lexicon::LexiconPolarity;
pub use newsapi::NewsApiFetcher;
pub use yahoo::YahooChartFetcher;
