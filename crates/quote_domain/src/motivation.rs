use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotivationalQuote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const DAILY_TITLE: &str = "🌅 Good Morning! Daily Motivation";

pub const MOTIVATIONAL_QUOTES: [MotivationalQuote; 10] = [
    MotivationalQuote {
        text: "The only way to do great work is to love what you do.",
        author: "Steve Jobs",
    },
    MotivationalQuote {
        text: "Innovation distinguishes between a leader and a follower.",
        author: "Steve Jobs",
    },
    MotivationalQuote {
        text: "Life is what happens when you're busy making other plans.",
        author: "John Lennon",
    },
    MotivationalQuote {
        text: "The future belongs to those who believe in the beauty of their dreams.",
        author: "Eleanor Roosevelt",
    },
    MotivationalQuote {
        text: "It is during our darkest moments that we must focus to see the light.",
        author: "Aristotle",
    },
    MotivationalQuote {
        text: "The only impossible journey is the one you never begin.",
        author: "Tony Robbins",
    },
    MotivationalQuote {
        text: "Success is not final, failure is not fatal.",
        author: "Winston Churchill",
    },
    MotivationalQuote {
        text: "Believe you can and you're halfway there.",
        author: "Theodore Roosevelt",
    },
    MotivationalQuote {
        text: "The best time to plant a tree was 20 years ago. The second best time is now.",
        author: "Chinese Proverb",
    },
    MotivationalQuote {
        text: "Your limitation—it's only your imagination.",
        author: "Unknown",
    },
];

pub fn pick_motivation<R: Rng + ?Sized>(rng: &mut R) -> MotivationalQuote {
    MOTIVATIONAL_QUOTES[rng.gen_range(0..MOTIVATIONAL_QUOTES.len())]
}

/// Body text shared by every quote-carrying notification.
pub fn quote_body(text: &str, author: &str) -> String {
    format!("\"{text}\"\n— {author}")
}
