//! Social media posts generated from sales data.
//!
//! The sales data is reduced to a [`ContentSummary`], each post kind turns
//! that into a prompt, and a [`TextGenerator`] writes the copy. A post whose
//! generation fails is logged and left out.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::ai::TextGenerator;
use crate::money::Amount;
use crate::record::SalesRecord;
use crate::report::Lang;

/// Facts the prompts are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSummary {
    pub featured_item: String,
    pub featured_category: String,
    pub top_seller: String,
    pub top_seller_category: String,
    pub top_seller_quantity: u64,
    pub weekend_item: String,
    pub weekend_category: String,
    pub lang: Lang,
}

#[derive(Default)]
struct ItemStats {
    category: String,
    revenue: Amount,
    quantity: u64,
    weekend_quantity: u64,
}

impl ContentSummary {
    /// Summarise `records`, or `None` when there is nothing to write about.
    pub fn from_records(records: &[SalesRecord], lang: Lang) -> Option<Self> {
        let mut stats: BTreeMap<&str, ItemStats> = BTreeMap::new();
        for record in records {
            let entry = stats.entry(record.item_name.as_str()).or_default();
            if entry.category.is_empty() {
                entry.category = record.category.clone();
            }
            // revenue only ranks items here, so saturating is fine
            entry.revenue = entry
                .revenue
                .checked_add(record.revenue())
                .unwrap_or(Amount::from_raw(u128::MAX));
            entry.quantity += u64::from(record.quantity);
            if record.is_weekend() {
                entry.weekend_quantity += u64::from(record.quantity);
            }
        }

        let (featured, featured_stats) = best_by(&stats, |s| s.revenue.raw())?;
        let (top_seller, top_stats) = best_by(&stats, |s| u128::from(s.quantity))?;

        let has_weekend = stats.values().any(|s| s.weekend_quantity > 0);
        let (weekend_item, weekend_stats) = if has_weekend {
            best_by(&stats, |s| u128::from(s.weekend_quantity))?
        } else {
            info!("no weekend sales, featuring the overall top seller for the weekend");
            (top_seller, top_stats)
        };

        Some(ContentSummary {
            featured_item: featured.to_owned(),
            featured_category: featured_stats.category.clone(),
            top_seller: top_seller.to_owned(),
            top_seller_category: top_stats.category.clone(),
            top_seller_quantity: top_stats.quantity,
            weekend_item: weekend_item.to_owned(),
            weekend_category: weekend_stats.category.clone(),
            lang,
        })
    }
}

// Highest key wins; the map is name-ordered so the first maximum is the
// alphabetically smallest name.
fn best_by<'a, F>(
    stats: &'a BTreeMap<&'a str, ItemStats>,
    key: F,
) -> Option<(&'a str, &'a ItemStats)>
where
    F: Fn(&ItemStats) -> u128,
{
    let mut best: Option<(&str, &ItemStats)> = None;
    for (name, item) in stats {
        if best.map_or(true, |(_, current)| key(item) > key(current)) {
            best = Some((*name, item));
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PostKind {
    DailySpecial,
    TopSeller,
    WeekendPromo,
}

impl PostKind {
    pub const ALL: [PostKind; 3] = [
        PostKind::DailySpecial,
        PostKind::TopSeller,
        PostKind::WeekendPromo,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            PostKind::DailySpecial => "daily_special",
            PostKind::TopSeller => "top_seller",
            PostKind::WeekendPromo => "weekend_promo",
        }
    }

    pub fn file_name(self) -> String {
        format!("social_{}.txt", self.slug())
    }

    pub fn title(self) -> &'static str {
        match self {
            PostKind::DailySpecial => "Daily Special",
            PostKind::TopSeller => "Top Seller",
            PostKind::WeekendPromo => "Weekend Promo",
        }
    }

    pub fn prompt(self, summary: &ContentSummary, restaurant: &str) -> String {
        let body = match self {
            PostKind::DailySpecial => format!(
                "Write a short, engaging Instagram post (max 150 words) for a restaurant called {restaurant}. \
                 The post is about today's special: {item} ({category}).{description} \
                 The restaurant serves traditional Balkan cuisine with modern fusion items.",
                item = summary.featured_item,
                category = summary.featured_category,
                description = describe(&summary.featured_item),
            ),
            PostKind::TopSeller => format!(
                "Write a short, celebratory Instagram post (max 150 words) for {restaurant} restaurant. \
                 Highlight that '{item}' ({category}) is the top seller this week with {sold} sold.{description}",
                item = summary.top_seller,
                description = describe(&summary.top_seller),
                category = summary.top_seller_category,
                sold = summary.top_seller_quantity,
            ),
            PostKind::WeekendPromo => format!(
                "Write a fun, inviting Instagram post (max 150 words) for {restaurant} restaurant's weekend special. \
                 Feature the dish: {item} ({category}).{description} \
                 Make it feel exciting and weekend-appropriate.",
                item = summary.weekend_item,
                description = describe(&summary.weekend_item),
                category = summary.weekend_category,
            ),
        };
        format!(
            "{body} Include relevant emojis and hashtags. {}",
            language_instruction(summary.lang)
        )
    }
}

const ITEM_DESCRIPTIONS: [(&str, &str); 9] = [
    ("Roasted Chicken", "Slow-cooked for 3 hours with a secret blend of Balkan herbs and spices. Crispy skin, tender meat."),
    ("Sarma", "Traditional cabbage rolls stuffed with seasoned meat and rice, simmered in a rich tomato broth."),
    ("Cevapi", "Hand-rolled grilled sausages served with fresh onions, kajmak and warm somun bread."),
    ("Bao Buns", "Fluffy steamed bao buns filled with Balkan-spiced pulled pork and pickled cabbage."),
    ("Caesar Salad", "Crisp romaine, shaved parmesan, crunchy croutons and a house-made Caesar dressing."),
    ("Shopska Salad", "Fresh tomatoes, cucumbers, peppers and onions under a generous layer of grated white cheese."),
    ("Baklava", "Layers of flaky phyllo dough, chopped walnuts and sweet honey syrup."),
    ("Turkish Coffee", "Rich, strong and traditionally brewed in a dzezva."),
    ("Rakija", "Smooth, aromatic plum brandy served chilled."),
];

/// Menu description for a known item, matched case-insensitively.
pub fn item_description(item_name: &str) -> Option<&'static str> {
    ITEM_DESCRIPTIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(item_name.trim()))
        .map(|(_, description)| *description)
}

fn describe(item_name: &str) -> String {
    item_description(item_name)
        .map(|description| format!(" Description: {description}"))
        .unwrap_or_default()
}

fn language_instruction(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "Write in English.",
        Lang::Sr => "Write in Serbian language.",
    }
}

/// Generate every post kind. Failed posts are logged and omitted.
pub fn generate_posts(
    summary: &ContentSummary,
    generator: &dyn TextGenerator,
    restaurant: &str,
) -> Vec<(PostKind, String)> {
    let mut posts = Vec::new();
    for kind in PostKind::ALL {
        match generator.generate(&kind.prompt(summary, restaurant)) {
            Ok(text) => {
                info!(post = kind.slug(), "generated post");
                posts.push((kind, text));
            }
            Err(e) => warn!(post = kind.slug(), error = %e, "skipping post"),
        }
    }
    posts
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use crate::ai::{AiError, TextGenerator};
    use crate::money::Amount;
    use crate::record::SalesRecord;
    use crate::report::Lang;
    use crate::social::{generate_posts, item_description, ContentSummary, PostKind};

    fn sale(date: &str, item: &str, category: &str, quantity: u32, price: &str) -> SalesRecord {
        SalesRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            item,
            category,
            quantity,
            Amount::parse(price).unwrap(),
        )
        .unwrap()
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            // Tuesday
            sale("2026-02-17", "Roasted Chicken", "Main", 10, "8.0"),
            sale("2026-02-17", "Turkish Coffee", "Drinks", 30, "1.5"),
            // Saturday
            sale("2026-02-21", "Rakija", "Drinks", 12, "3.0"),
            sale("2026-02-21", "Roasted Chicken", "Main", 2, "8.0"),
        ]
    }

    struct Recorder {
        prompts: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl TextGenerator for Recorder {
        fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.borrow_mut().push(prompt.to_owned());
            match self.fail_on {
                Some(marker) if prompt.contains(marker) => Err(AiError::Api {
                    status: 429,
                    message: "rate limited".to_owned(),
                }),
                _ => Ok(format!("post #{}", self.prompts.borrow().len())),
            }
        }
    }

    #[test]
    fn test_summary_picks_items() {
        let summary = ContentSummary::from_records(&sample(), Lang::En).unwrap();

        assert_eq!(summary.featured_item, "Roasted Chicken");
        assert_eq!(summary.featured_category, "Main");
        assert_eq!(summary.top_seller, "Turkish Coffee");
        assert_eq!(summary.top_seller_quantity, 30);
        assert_eq!(summary.weekend_item, "Rakija");
        assert_eq!(summary.weekend_category, "Drinks");
    }

    #[test]
    fn test_weekend_falls_back_to_top_seller() {
        let weekdays: Vec<SalesRecord> = sample()
            .into_iter()
            .filter(|record| !record.is_weekend())
            .collect();
        let summary = ContentSummary::from_records(&weekdays, Lang::Sr).unwrap();
        assert_eq!(summary.weekend_item, "Turkish Coffee");
    }

    #[test]
    fn test_ties_go_to_first_name() {
        let records = vec![
            sale("2026-02-17", "Sarma", "Main", 4, "5.0"),
            sale("2026-02-17", "Cevapi", "Main", 4, "5.0"),
        ];
        let summary = ContentSummary::from_records(&records, Lang::En).unwrap();
        assert_eq!(summary.featured_item, "Cevapi");
        assert_eq!(summary.top_seller, "Cevapi");
    }

    #[test]
    fn test_no_records_no_summary() {
        assert!(ContentSummary::from_records(&[], Lang::En).is_none());
    }

    #[test]
    fn test_prompts_name_restaurant_item_and_language() {
        let summary = ContentSummary::from_records(&sample(), Lang::Sr).unwrap();
        let prompt = PostKind::TopSeller.prompt(&summary, "Kod Mike");

        assert!(prompt.contains("Kod Mike"));
        assert!(prompt.contains("'Turkish Coffee' (Drinks)"));
        assert!(prompt.contains("30 sold"));
        assert!(prompt.ends_with("Write in Serbian language."));

        let summary = ContentSummary::from_records(&sample(), Lang::En).unwrap();
        let prompt = PostKind::WeekendPromo.prompt(&summary, "Kod Mike");
        assert!(prompt.contains("Rakija (Drinks)"));
        assert!(prompt.ends_with("Write in English."));
    }

    #[test]
    fn test_failed_post_is_omitted() {
        let summary = ContentSummary::from_records(&sample(), Lang::En).unwrap();
        let generator = Recorder {
            prompts: RefCell::new(Vec::new()),
            fail_on: Some("celebratory"),
        };

        let posts = generate_posts(&summary, &generator, "Koko Loko");

        assert_eq!(generator.prompts.borrow().len(), 3);
        let kinds: Vec<PostKind> = posts.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, vec![PostKind::DailySpecial, PostKind::WeekendPromo]);
        assert_eq!(posts[1].1, "post #3");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(PostKind::DailySpecial.file_name(), "social_daily_special.txt");
        assert_eq!(PostKind::WeekendPromo.file_name(), "social_weekend_promo.txt");
    }

    #[test]
    fn test_known_items_carry_a_description() {
        assert!(item_description("rakija").unwrap().contains("plum brandy"));
        assert_eq!(item_description("Mystery Stew"), None);

        let summary = ContentSummary::from_records(&sample(), Lang::En).unwrap();
        let prompt = PostKind::WeekendPromo.prompt(&summary, "Koko Loko");
        assert!(prompt.contains("Rakija (Drinks). Description: Smooth, aromatic plum brandy"));

        let records = vec![sale("2026-02-17", "Mystery Stew", "Main", 3, "4.0")];
        let summary = ContentSummary::from_records(&records, Lang::En).unwrap();
        let prompt = PostKind::DailySpecial.prompt(&summary, "Koko Loko");
        assert!(!prompt.contains("Description:"));
        assert!(prompt.contains("Mystery Stew (Main). The restaurant"));
    }
}
