//! Markup tokenizing into start/end tag events
//!
//! The page is run through html5ever's tokenizer, not its tree builder, so
//! every tag in the source yields exactly one event and nothing is inserted
//! or repaired. The stream is therefore not necessarily balanced: consumers
//! must tolerate stray end tags and elements left open at end of input.
//! Script and style bodies are read as raw text, so markup inside them
//! produces no events.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// One markup tag event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
}

impl TagEvent {
    /// Builds a start event from borrowed parts
    pub fn start(name: &str, attrs: &[(&str, &str)]) -> Self {
        Self::Start {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Builds an end event
    pub fn end(name: &str) -> Self {
        Self::End {
            name: name.to_string(),
        }
    }
}

/// Looks up an attribute value by name
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Returns true if the class attribute contains `token` as a whole token
pub fn has_class(attrs: &[(String, String)], token: &str) -> bool {
    attr(attrs, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == token))
}

/// Collects tag tokens as they come out of the tokenizer
#[derive(Default)]
struct EventSink {
    events: Vec<TagEvent>,
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(tag) = token else {
            return TokenSinkResult::Continue;
        };

        let name = tag.name.to_string();

        match tag.kind {
            TagKind::StartTag => {
                let attrs = tag
                    .attrs
                    .iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                self.events.push(TagEvent::Start {
                    name: name.clone(),
                    attrs,
                });

                // `<x/>` is reported as a start immediately followed by its end
                if tag.self_closing {
                    self.events.push(TagEvent::End { name });
                    return TokenSinkResult::Continue;
                }

                match name.as_str() {
                    "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" => TokenSinkResult::RawData(RawKind::Rawtext),
                    _ => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                self.events.push(TagEvent::End { name });
                TokenSinkResult::Continue
            }
        }
    }
}

/// Tokenizes markup and returns its tag events in source order
pub fn tokenize(html: &str) -> Vec<TagEvent> {
    let mut queue = BufferQueue::new();
    queue.push_back(StrTendril::from_slice(html));

    let mut tokenizer = Tokenizer::new(EventSink::default(), TokenizerOpts::default());
    // The sink never suspends for scripts, so one feed consumes the whole queue
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();

    tokenizer.sink.events
}
