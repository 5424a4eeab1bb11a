//! # Template & Style Catalog
//!
//! Static lookup tables for the supported pitch frameworks, visual styles,
//! and output languages. Everything here is compile-time data tagged by a
//! closed set of identifiers; behavior is identical across entries, only the
//! data differs, so there is no trait object in sight.

use serde::{Deserialize, Serialize};

/// Supported pitch-deck frameworks.
///
/// Each framework fixes an ordered list of slide topics; the drafter is
/// required to produce exactly one slide per topic, in topic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchTemplate {
    Sequoia,
    Yc,
    Kawasaki,
    #[serde(rename = "500startups")]
    FiveHundredStartups,
    Unusual,
    Soma,
    Intercom,
    Khosla,
    Canonical,
}

impl PitchTemplate {
    /// All frameworks, in UI display order.
    pub fn all() -> Vec<PitchTemplate> {
        vec![
            PitchTemplate::Sequoia,
            PitchTemplate::Yc,
            PitchTemplate::Kawasaki,
            PitchTemplate::FiveHundredStartups,
            PitchTemplate::Unusual,
            PitchTemplate::Soma,
            PitchTemplate::Intercom,
            PitchTemplate::Khosla,
            PitchTemplate::Canonical,
        ]
    }

    /// Stable identifier used on the wire and in the UI.
    pub fn id(&self) -> &'static str {
        match self {
            PitchTemplate::Sequoia => "sequoia",
            PitchTemplate::Yc => "yc",
            PitchTemplate::Kawasaki => "kawasaki",
            PitchTemplate::FiveHundredStartups => "500startups",
            PitchTemplate::Unusual => "unusual",
            PitchTemplate::Soma => "soma",
            PitchTemplate::Intercom => "intercom",
            PitchTemplate::Khosla => "khosla",
            PitchTemplate::Canonical => "canonical",
        }
    }

    /// Display name for UI
    pub fn name(&self) -> &'static str {
        match self {
            PitchTemplate::Sequoia => "Sequoia Capital",
            PitchTemplate::Yc => "Y Combinator",
            PitchTemplate::Kawasaki => "Guy Kawasaki (10/20/30)",
            PitchTemplate::FiveHundredStartups => "500 Startups",
            PitchTemplate::Unusual => "Unusual Ventures",
            PitchTemplate::Soma => "SOMA (Founders Fund)",
            PitchTemplate::Intercom => "Intercom (Early Stage)",
            PitchTemplate::Khosla => "Khosla Ventures",
            PitchTemplate::Canonical => "The Best Practice (Feld/Cowan)",
        }
    }

    /// One-line description shown under the framework selector.
    pub fn description(&self) -> &'static str {
        match self {
            PitchTemplate::Sequoia => {
                "The gold standard. Focuses on clarity, market size, and 'Why Now'. Perfect for Series A."
            }
            PitchTemplate::Yc => {
                "Traction-first. Concise. Focuses on 'Make something people want' and growth."
            }
            PitchTemplate::Kawasaki => {
                "10 slides, short and punchy. Focuses on 'Underlying Magic' and business model."
            }
            PitchTemplate::FiveHundredStartups => {
                "Dave McClure style. Emphasizes Traction, Customer Acquisition, and Unfair Advantage."
            }
            PitchTemplate::Unusual => {
                "Story-driven. Starts with a 'Human Story' (Opening Gambit) and Team early on."
            }
            PitchTemplate::Soma => {
                "Hardware/Product focus. Heavily emphasizes Unit Economics, IP/Barriers, and future Vision."
            }
            PitchTemplate::Intercom => {
                "SaaS focus. Problem/Solution clarity, Competitor Landscape, and Progress/Beta traction."
            }
            PitchTemplate::Khosla => {
                "High Emotion & Logic. 'Visceral Punch', Declarative Titles, Risk Mitigation."
            }
            PitchTemplate::Canonical => {
                "The universal consensus deck (10/20/30). Combines Feld, Cowan, and Kawasaki best practices."
            }
        }
    }

    /// Ordered topic guides. One slide is generated per entry, in this order.
    pub fn topics(&self) -> &'static [&'static str] {
        match self {
            PitchTemplate::Sequoia => &[
                "Company Purpose: Define the company/business in a single declarative sentence.",
                "Problem: Describe the pain of the customer. How is this addressed today?",
                "Solution: Value proposition. Where your product sits. Provide use cases.",
                "Why Now: Historical evolution of category. Recent trends making this possible.",
                "Market Size: Profile the customer. Calculate TAM (top down), SAM (bottoms up), and SOM.",
                "Competition: List competitors and competitive advantages.",
                "Product: Line-up, form factor, functionality, features, IP, roadmap.",
                "Business Model: Revenue model, pricing, average account size/LTV, sales & distribution.",
                "Team: Founders, Management, Board of Directors/Advisors.",
                "Financials: P&L, Balance sheet, Cash flow, Cap table, The deal.",
            ],
            PitchTemplate::Yc => &[
                "Title: Company name and one-line description.",
                "Problem: The specific problem you are solving.",
                "Solution: How you solve it.",
                "Traction: Growth metrics, revenue, active users. (This is key for YC).",
                "Unique Insight: What do you know that others don't? (The 'Secret').",
                "Market: How big is the opportunity?",
                "Competition: Why you win.",
                "Business Model: How you make money.",
                "Team: Why you?",
                "Ask: What do you need?",
            ],
            PitchTemplate::Kawasaki => &[
                "Title: Company name, your name, contact info.",
                "Problem/Opportunity: The pain you alleviate or pleasure you provide.",
                "Value Proposition: The value of the pain alleviated.",
                "Underlying Magic: Technology, secret sauce, or magic behind the product.",
                "Business Model: Who has your money and how you get it.",
                "Go-To-Market Plan: How to reach customers without breaking the bank.",
                "Competitive Analysis: Complete view of competitive landscape.",
                "Team: Key players, investors, advisors.",
                "Financial Projections: 3-year forecast, metrics (bottom-up).",
                "Status/Timeline: Current status, accomplishments, timeline, use of funds.",
            ],
            PitchTemplate::FiveHundredStartups => &[
                "Logo & Elevator Pitch: Product type, target customer, problem, benefit, secret sauce.",
                "The Problem: From the customer's point of view.",
                "Your Solution: Product key features and top benefits.",
                "How it Works: User experience, tech, proprietary differentiation.",
                "Traction: User or revenue growth (MRR, GMV, MoM).",
                "Business Model: Top sources of revenue (Direct vs Indirect).",
                "Competition: How you are different. (Quadrant chart concept).",
                "The Market Opportunity: Market size >$1B (Top Down or Bottom Up).",
                "Progress to Date: Launch date, first customer, key milestones.",
                "The Team: Founders' unfair advantage (Experience, Product, Industry, Sales).",
            ],
            PitchTemplate::Unusual => &[
                "Opening Gambit: Human story about the problem/benefit. Hook the listener.",
                "Team: Why this group is uniquely qualified.",
                "Problem Statement: Zoom out to greater trend, zoom in to pain.",
                "Market: TAM/SAM (Billions). Bottoms-up analysis.",
                "Solution: The 'Vision' and what is unique/defensible.",
                "Competition: 2x2 matrix or Harvey ball chart criteria.",
                "Go To Market: Beachhead use case. Target user/buyer.",
                "Traction: Customer conversations, POCs, or Product Market Fit evidence.",
                "Operating Plan & Financials: Execution goals for next 24 months (headcount, product, burn).",
            ],
            PitchTemplate::Soma => &[
                "Title: 'A Revolution In...'. High level quotes/endorsements.",
                "The Problem/Solution: Break the main barrier. Explain the unique insight (e.g. Psychology of use).",
                "The Team: Proven exits, specific relevant experience, board members.",
                "The Product: Unit Economics (Cost vs Price vs Margin), status of manufacturing.",
                "The Market (User Base): Growing population, relevant demographic trends.",
                "The Market (Opportunity): Total spend, average price point, existing competitor weakness.",
                "Barriers To Entry & Sales Plan: IP/Patents, Endorsements, Distribution channels.",
                "Funding History & Use of Proceeds: Previous rounds, ideal investor profile, current cash/runway.",
                "Future Prospects & Vision: How the product becomes a platform/company (Expansion).",
                "Financial Model: Key assumptions and projections.",
            ],
            PitchTemplate::Intercom => &[
                "Title: Logo and minimalist branding.",
                "The Team: Founders' roles, past exits/companies, expertise.",
                "The Problem: Why the current way is hard/impossible. (e.g. 'Current tools are broken').",
                "The Solution: Simple install. Key features list (browsing, research, messaging).",
                "The Market: Current market size vs Future market expansion.",
                "Landscape / Competitors: List competitors by category (Social, Support, Email, Analytics).",
                "Progress: Development timeline, Beta status, Testimonials/Tweets.",
                "What We're Looking For: Funding amount, runway goals (PMF, Dev, Profitability).",
            ],
            PitchTemplate::Khosla => &[
                "Title: Declarative statement explaining company mission. (e.g. 'We revolutionize X').",
                "The Problem: Focus on the 'Visceral Punch'. Use emotion. Why is this hard?",
                "Reasons to Invest: State 3-5 major takeaways upfront. (Greed, Advantage, Market).",
                "The Solution: Don't obscure tech. Highlight the 10,000x enhancement.",
                "Market: Bottom-up analysis only. No top-down vanity metrics.",
                "Competition: Show advantage clearly (e.g. '96% lower cost').",
                "Team: Emphasize unique advantages/experience. Don't just list logos.",
                "Risk Mitigation: Address investor fears directly (Tech, Market, Execution risks).",
                "Financials: Clearly layout financials. Less is more (7 rows max).",
                "The Ask: Funding history, milestones, and use of proceeds.",
            ],
            PitchTemplate::Canonical => &[
                "Cover Slide: Contact info, tagline. Mission accomplished statement.",
                "Mission/Vision: What problem are you solving and for whom? (Achievable but not yet achieved).",
                "Market/Problem: Emphasize the pain level. Why incumbents fail.",
                "Product/Solution: The benefits that address the pain. Don't get lost in features.",
                "Underlying Magic: The technology/methodology/patent. The 'Secret Sauce'.",
                "Target Customer: Who writes the check? Ideal customer profile.",
                "Value Proposition: ROI. Are you selling aspirin (need) or vitamins (nice-to-have)?",
                "Sales Strategy: CAC, LTV, distribution channels. How do you get customers?",
                "Management Team: Experience, missing pieces, advisors.",
                "Revenue Model: How you make money. Path to profitability.",
                "Competition: Landscape. Don't deny competitors exist. Why you are different.",
                "Status & Funding: Milestones achieved, metrics, and funding requirements.",
            ],
        }
    }

    /// Slide count this framework mandates.
    pub fn slide_count(&self) -> usize {
        self.topics().len()
    }
}

/// Visual style presets conditioning the image prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualStyle {
    Corporate,
    TechMinimal,
    Swiss,
    Editorial,
    /// User supplies their own modifier text instead of a preset.
    Custom,
}

impl VisualStyle {
    /// All styles, in UI display order.
    pub fn all() -> Vec<VisualStyle> {
        vec![
            VisualStyle::Corporate,
            VisualStyle::TechMinimal,
            VisualStyle::Swiss,
            VisualStyle::Editorial,
            VisualStyle::Custom,
        ]
    }

    /// Stable identifier used on the wire and in the UI.
    pub fn id(&self) -> &'static str {
        match self {
            VisualStyle::Corporate => "corporate",
            VisualStyle::TechMinimal => "tech_minimal",
            VisualStyle::Swiss => "swiss",
            VisualStyle::Editorial => "editorial",
            VisualStyle::Custom => "custom",
        }
    }

    /// Display name for UI
    pub fn name(&self) -> &'static str {
        match self {
            VisualStyle::Corporate => "Executive / Fortune 500",
            VisualStyle::TechMinimal => "Silicon Valley Minimalist",
            VisualStyle::Swiss => "Swiss International",
            VisualStyle::Editorial => "High-End Editorial",
            VisualStyle::Custom => "Custom Style",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            VisualStyle::Corporate => {
                "Trustworthy, established, clean. Think consulting firms or major banks."
            }
            VisualStyle::TechMinimal => {
                "Stripe/Apple aesthetic. Lots of whitespace, clean typography."
            }
            VisualStyle::Swiss => "Bold grid systems, strong typography, modernist.",
            VisualStyle::Editorial => "Magazine quality. Focus on dramatic imagery and serif fonts.",
            VisualStyle::Custom => "Define your own unique visual style.",
        }
    }

    /// Preset prompt modifier. Empty for [`VisualStyle::Custom`], which is
    /// overridden by caller-supplied text.
    pub fn prompt_modifier(&self) -> &'static str {
        match self {
            VisualStyle::Corporate => {
                "high-end corporate photography, clean office environments, glass and steel architecture, professional lighting, photorealistic, trust, executive style, 8k"
            }
            VisualStyle::TechMinimal => {
                "silicon valley tech aesthetic, stripe style, clean white backgrounds, soft shadows, modern minimalism, high tech, premium product photography"
            }
            VisualStyle::Swiss => {
                "swiss international style, bauhaus influence, bold typography, grid systems, geometric shapes, clean lines, modernist architecture, muted but strong colors"
            }
            VisualStyle::Editorial => {
                "editorial fashion photography style, vogue aesthetic, dramatic lighting, high contrast, cinematic depth of field, award winning photography, emotive"
            }
            VisualStyle::Custom => "",
        }
    }

    /// Effective modifier for a generation request: the user override wins
    /// only when this style is `Custom` and the override is non-blank.
    pub fn resolved_modifier<'a>(&self, custom: Option<&'a str>) -> &'a str {
        match (self, custom) {
            (VisualStyle::Custom, Some(text)) if !text.trim().is_empty() => text,
            _ => self.prompt_modifier(),
        }
    }
}

/// Output languages for slide copy and speaker notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Pt,
    Fr,
    De,
    Zh,
    Ja,
}

impl Language {
    pub fn all() -> Vec<Language> {
        vec![
            Language::En,
            Language::Es,
            Language::Pt,
            Language::Fr,
            Language::De,
            Language::Zh,
            Language::Ja,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Pt => "pt",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Zh => "zh",
            Language::Ja => "ja",
        }
    }

    /// Native-script name, used both in the UI and inside prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::Pt => "Português",
            Language::Fr => "Français",
            Language::De => "Deutsch",
            Language::Zh => "中文",
            Language::Ja => "日本語",
        }
    }
}
