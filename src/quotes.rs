//! Canned-quote listener: answers "hey janet" with a random Janet line.
//!
//! Independent of the respond rules; both may answer the same message.

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;

/// Default phrase the listener reacts to.
pub const DEFAULT_PATTERN: &str = r"(?i)hey,?\sjanet";

const QUOTES: &[&str] = &[
    "Humans only live 80 years, and they spend so much of it just waiting for things to be over.",
    "Can I get you started with some drinks? Our specialty cocktail tonight is the Fourth \
     of July. It's half an apple pie blended with Southern Comfort and Coca-Cola, served in \
     a Chevy hubcap.",
    "Simone and Chidi are good together. I've been running simulations on what their kids \
     will be like. One of them is hot enough to be on \"The Bachelor\" and smart enough to \
     never go on \"The Bachelor.\"",
    "Ooh, I've never had to walk before, this is fun! [Walks a few steps] Now I'm bored. \
     Walking is dumb.",
    "Oh, really? Is it an error to act unpredictably and behave in ways that run counter to \
     how you were programmed to behave?",
    "It's turns out the best Janet was the Janet that was inside Janet all along.",
    "Fun fact, Janet is me.",
    "Fun fact... The first Janet had a click wheel.",
    "I know what you have to do now. Kill me! Sorry, I say everything in a cheery manner, \
     but in this case in may be inappropriate, so I'll try again.",
    "I suppose after 802 reboots I must have gained the ability to lie. That's fun! I want \
     to try to lie again. I love your outfit.",
    "Hi, guys! I'm broken.",
    "Fun fact... mathematically, it's equally likely to either im- or ex-plode.",
    "I have tickets to Hamilton next week, and there's a rumor that Daveed Diggs is coming back!",
    "That's the good news. The bad news is I seem to be losing my ability to sustain object \
     permanence. So it's sort of a glass half full, glass stops existing in time and space \
     kind of deal.",
    "Fun fact, a 'wheelhouse' is a part of a boat.",
    "Fun fact, all deceased members of the Portland Trail Blazers basketball team are also \
     in The Bad Place.",
    "There have been 25 generations of Janet. Each new update of Janet gains more wisdom \
     and social abilities. Fun fact: the first Janet had a click wheel.",
    "What do you think happens when people walk through the door? It's the only thing in \
     the universe I don't know.",
    "The judge gave me the power to make you an actual human.",
    "Where does this hope come from, man? This insane hope that people are worth the trouble?",
    "Eleanor told me that instead of being sad I should \"Go get it, girl\" so I'm going to \
     go get it, girl.",
    "Love isn't a triange. It's a five dimensional blob, so......",
    "I don't have a mom, so I've been experimenting with thinking of The Judge as my mom.",
    "Farts.",
    "What up, skidmarks?",
];

/// Listens for the call phrase and picks a random quote.
pub struct QuoteListener {
    pattern: Regex,
}

impl QuoteListener {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// A quote when `text` contains the call phrase.
    pub fn hear(&self, text: &str) -> Option<&'static str> {
        if !self.pattern.is_match(text) {
            return None;
        }
        self.pick(&mut rand::thread_rng())
    }

    fn pick<R: Rng>(&self, rng: &mut R) -> Option<&'static str> {
        QUOTES.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn listener() -> QuoteListener {
        QuoteListener::new(Regex::new(DEFAULT_PATTERN).unwrap())
    }

    #[test]
    fn test_hears_call_phrase() {
        let listener = listener();
        assert!(listener.hear("hey janet").is_some());
        assert!(listener.hear("Hey, Janet, what's up?").is_some());
        assert!(listener.hear("so I said HEY JANET and nothing").is_some());
    }

    #[test]
    fn test_ignores_other_text() {
        let listener = listener();
        assert!(listener.hear("hello janet").is_none());
        assert!(listener.hear("heyjanet").is_none());
        assert!(listener.hear("hey there").is_none());
    }

    #[test]
    fn test_picks_from_list() {
        let listener = listener();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let quote = listener.pick(&mut rng).unwrap();
            assert!(QUOTES.contains(&quote));
        }
    }

    #[test]
    fn test_quote_list() {
        assert_eq!(QUOTES.len(), 25);
        assert!(QUOTES.contains(&"Fun fact, Janet is me."));
        assert!(QUOTES.contains(&"What up, skidmarks?"));
    }

    #[test]
    fn test_custom_pattern() {
        let listener = QuoteListener::new(Regex::new(r"(?i)\bping\b").unwrap());
        assert!(listener.hear("Ping!").is_some());
        assert!(listener.hear("hey janet").is_none());
    }
}
