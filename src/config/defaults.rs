/// Built-in seed list: regional Pennsylvania news outlets.
///
/// `pennlive.com` appears twice (with and without a trailing slash); the
/// duplicate is harmless because requests are deduplicated by URL.
pub const SEED_URLS: &[&str] = &[
    "https://www.inquirer.com/",
    "https://www.post-gazette.com",
    "https://www.mcall.com",
    "https://www.lancasteronline.com",
    "https://www.witf.org",
    "https://www.wtae.com",
    "https://www.wpxi.com",
    "https://www.kdka.com",
    "https://www.nbcphiladelphia.com",
    "https://www.6abc.com",
    "https://www.cbsnews.com/philadelphia/",
    "https://www.timesleader.com",
    "https://www.citizensvoice.com",
    "https://www.delcotimes.com",
    "https://www.pennlive.com",
    "https://www.triblive.com",
    "https://www.ydr.com",
    "https://www.theintell.com",
    "https://www.pennlive.com/",
    "https://www.couriertimes.com",
    "https://www.phillytrib.com",
    "https://www.observer-reporter.com",
    "https://www.statecollegelive.com",
    "https://www.ldnews.com",
    "https://www.timesherald.com",
    "https://www.bradfordera.com",
    "https://www.dailyitem.com",
    "https://www.greenfieldreporter.com",
    "https://www.grovecitynews.com",
    "https://www.republicanherald.com",
];

pub fn seed_urls() -> Vec<String> {
    SEED_URLS.iter().map(|s| s.to_string()).collect()
}
