//! Built-in example posts used to seed an empty local store

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::post::{BlogPost, PostStatus};

/// A static example post
pub struct SeedPost {
    /// Stable identifier, used as the slug
    pub slug: &'static str,
    pub title: &'static str,
    pub excerpt: &'static str,
    pub content: &'static str,
    pub image: &'static str,
    pub category: &'static str,
    pub author: &'static str,
    /// Publication date, e.g. "January 20, 2026"
    pub date: &'static str,
    pub read_time: &'static str,
}

pub const SEED_POSTS: &[SeedPost] = &[
    SeedPost {
        slug: "maximizing-rental-income-qatar",
        title: "5 Ways to Maximize Your Rental Income in Qatar's Competitive Market",
        excerpt: "Discover proven strategies to increase your property's rental yield while maintaining high occupancy rates in Doha's dynamic real estate market.",
        content: r#"
<p>Qatar's rental market continues to evolve, presenting both challenges and opportunities for property owners. With increasing competition, it's essential to adopt strategies that set your property apart while maximizing returns.</p>

<h3>1. Professional Property Management</h3>
<p>Partnering with an experienced property management company ensures your property is maintained to the highest standards, marketed effectively, and managed with attention to tenant satisfaction. This professional approach often translates to higher rental rates and lower vacancy periods.</p>

<h3>2. Strategic Furnishing and Upgrades</h3>
<p>Modern, quality furnishings can significantly impact rental value. Focus on durable, stylish pieces that appeal to corporate tenants and families. Consider smart home features that add convenience and modernity.</p>

<h3>3. Flexible Lease Terms</h3>
<p>Offering both short-term and long-term rental options allows you to capture different market segments and optimize pricing based on demand cycles throughout the year.</p>

<h3>4. Exceptional Maintenance Standards</h3>
<p>Properties that are well-maintained command premium rates. Regular inspections, prompt repairs, and preventive maintenance protect your investment and keep tenants satisfied.</p>

<h3>5. Targeted Marketing</h3>
<p>Understanding your target demographic, whether corporate executives, families, or short-stay visitors, allows for more effective marketing that reaches the right tenants willing to pay premium rates.</p>
"#,
        image: "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=800&q=80",
        category: "Investment Tips",
        author: "YouFirst Team",
        date: "January 20, 2026",
        read_time: "5 min read",
    },
    SeedPost {
        slug: "furnished-vs-unfurnished-rentals",
        title: "Furnished vs. Unfurnished Rentals: What Qatar Landlords Need to Know",
        excerpt: "A comprehensive comparison to help property owners decide the best rental strategy for their investment properties in Qatar.",
        content: r#"
<p>One of the most important decisions property owners face is whether to offer their units furnished or unfurnished. Each approach has distinct advantages, and the right choice depends on your investment goals and target market.</p>

<h3>The Furnished Advantage</h3>
<p>Furnished properties in Qatar typically command 20-40% higher rental rates compared to unfurnished units. They appeal strongly to:</p>
<ul>
  <li>Corporate tenants on assignment</li>
  <li>Expatriates newly arriving in Qatar</li>
  <li>Short-term visitors and tourists</li>
  <li>Professionals seeking convenience</li>
</ul>

<h3>Investment Considerations</h3>
<p>While furnished rentals require higher upfront investment in furniture and appliances, the increased rental income typically recovers this cost within 12-18 months. Professional management ensures furniture is maintained and replaced strategically.</p>

<h3>Market Demand in Doha</h3>
<p>With Qatar's growing international workforce and tourism sector, demand for quality furnished accommodation remains strong. Properties near business districts, cultural sites, and entertainment venues see particularly high demand.</p>

<h3>Our Recommendation</h3>
<p>For most investors in Qatar's current market, furnished rentals offer the best combination of rental yield and occupancy rates. The key is partnering with a management company that understands both property care and tenant expectations.</p>
"#,
        image: "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800&q=80",
        category: "Property Guide",
        author: "YouFirst Team",
        date: "January 15, 2026",
        read_time: "4 min read",
    },
    SeedPost {
        slug: "tenant-screening-best-practices",
        title: "The Art of Tenant Screening: Protecting Your Qatar Property Investment",
        excerpt: "Learn the essential steps to finding reliable, quality tenants who will care for your property and fulfill their lease obligations.",
        content: r#"
<p>Finding the right tenant is one of the most critical aspects of property management. A thorough screening process protects your investment and ensures a positive rental experience for all parties.</p>

<h3>Essential Screening Steps</h3>
<p>A comprehensive tenant screening process should include:</p>
<ul>
  <li>Identity and visa/residency verification</li>
  <li>Employment and income verification</li>
  <li>Reference checks from previous landlords</li>
  <li>Credit history assessment where available</li>
</ul>

<h3>Understanding Qatar's Rental Market</h3>
<p>Qatar's diverse expatriate population requires cultural sensitivity and understanding of various employment arrangements. Corporate-sponsored tenants often represent lower risk due to employer backing.</p>

<h3>Red Flags to Watch For</h3>
<p>Be cautious of applicants who are reluctant to provide references, have frequent moves in their history, or show inconsistencies in their application. Professional property managers are trained to identify these warning signs.</p>

<h3>The Value of Professional Screening</h3>
<p>Professional property management companies have established processes, local market knowledge, and legal expertise to conduct thorough screenings while remaining compliant with Qatar's regulations. This expertise significantly reduces the risk of problematic tenancies.</p>
"#,
        image: "https://images.unsplash.com/photo-1600585154340-be6161a56a0c?w=800&q=80",
        category: "Management Tips",
        author: "YouFirst Team",
        date: "January 10, 2026",
        read_time: "6 min read",
    },
];

/// Parse a "January 20, 2026" style date as midnight UTC
pub fn parse_seed_date(date: &str) -> Option<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date.trim(), "%B %d, %Y").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc())
}

impl SeedPost {
    /// Materialize the seed with a fresh id
    pub fn to_post(&self, now: DateTime<Utc>) -> BlogPost {
        let created_at = parse_seed_date(self.date).unwrap_or_else(|| {
            tracing::warn!("Unparsable seed date {:?} for {}", self.date, self.slug);
            now
        });
        BlogPost {
            id: Uuid::new_v4().to_string(),
            slug: self.slug.to_string(),
            title: self.title.to_string(),
            excerpt: self.excerpt.to_string(),
            content: self.content.trim().to_string(),
            image_url: Some(self.image.to_string()),
            category: self.category.to_string(),
            author: self.author.to_string(),
            read_time: self.read_time.to_string(),
            status: PostStatus::Published,
            created_at,
            updated_at: now,
            published_at: Some(created_at),
            created_by: Some("system".to_string()),
        }
    }
}

/// All built-in posts, in their listing order
pub fn seed_posts(now: DateTime<Utc>) -> Vec<BlogPost> {
    SEED_POSTS.iter().map(|seed| seed.to_post(now)).collect()
}
