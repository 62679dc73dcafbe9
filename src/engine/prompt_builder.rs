use crate::model::contact::ContactRoster;
use crate::model::message::{ChatMessage, HostChatEntry};
use crate::model::session::StreamerProfile;
use crate::model::settings::FlingSettings;

/// Host chat lines quoted verbatim in the system prompt.
pub const RECENT_CHAT_LINES: usize = 30;

/// Rough characters-per-token ratio used for the story budget.
const CHARS_PER_TOKEN: f64 = 2.5;

/// What the prompt needs to know about the stream right now.
pub struct PromptContext<'a> {
    pub settings: &'a FlingSettings,
    pub profile: &'a StreamerProfile,
    pub roster: &'a ContactRoster,
    /// Host chat, oldest first.
    pub history: &'a [HostChatEntry],
    pub title: &'a str,
    pub follower_count: u64,
    pub viewer_count: u64,
}

/// Builds the message list asking the model for viewer reactions.
/// Formatting only: no parsing, no networking.
pub fn build_viewer_prompt(ctx: &PromptContext, action: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt(ctx, action))];

    messages.extend(story_context(ctx.history, ctx.settings.max_context_tokens));

    messages.push(ChatMessage::user(format!(
        "[{}'s action on stream]: {}\n\nGenerate viewer chat reactions in Korean:",
        ctx.settings.display_name(),
        action
    )));

    if !ctx.settings.prefill.is_empty() {
        messages.push(ChatMessage::assistant(ctx.settings.prefill.clone()));
    }

    messages
}

fn system_prompt(ctx: &PromptContext, action: &str) -> String {
    let mut prompt = String::new();

    push_contacts(&mut prompt, ctx.roster);
    push_recent_chat(&mut prompt, ctx);
    push_user_profile(&mut prompt, ctx);
    push_streamer_profile(&mut prompt, ctx);
    push_currency(&mut prompt, ctx);
    push_stream_rules(&mut prompt, ctx, action);

    prompt
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

fn streamer_nickname<'a>(ctx: &'a PromptContext) -> &'a str {
    or_placeholder(&ctx.profile.nickname, ctx.settings.display_name())
}

fn push_contacts(prompt: &mut String, roster: &ContactRoster) {
    prompt.push_str(
        "### Registered Contacts (may appear in chat based on their personality and chat history context)\n",
    );
    if roster.is_empty() {
        prompt.push_str("(No contacts registered)\n");
    }
    for c in roster.contacts() {
        prompt.push_str(&format!(
            "- {}: {} / Tags: {}\n",
            c.name,
            or_placeholder(&c.persona, "(no personality set)"),
            or_placeholder(&c.tags, "none")
        ));
    }
    prompt.push('\n');
}

fn push_recent_chat(prompt: &mut String, ctx: &PromptContext) {
    prompt.push_str("### Recent Chat History (RP context outside of streaming)\n");

    let skip = ctx.history.len().saturating_sub(RECENT_CHAT_LINES);
    let recent = &ctx.history[skip..];
    if recent.is_empty() {
        prompt.push_str("(No recent history)\n");
    }
    for m in recent {
        let name = if m.is_user {
            ctx.settings.display_name()
        } else {
            or_placeholder(&m.name, "Assistant")
        };
        prompt.push_str(&format!("{}: {}\n", name, m.mes));
    }
    prompt.push('\n');
}

fn push_user_profile(prompt: &mut String, ctx: &PromptContext) {
    let s = ctx.settings;
    prompt.push_str("### User Profile\n");
    prompt.push_str(&format!("Name: {}\n", s.display_name()));
    prompt.push_str(&format!(
        "Personality: {}\n",
        or_placeholder(&s.user_personality, "(not specified)")
    ));
    prompt.push_str(&format!(
        "Appearance: {}\n",
        or_placeholder(&s.user_tags, "(not specified)")
    ));
    prompt.push_str(&format!("Current Followers: {}\n\n", ctx.follower_count));
}

fn push_streamer_profile(prompt: &mut String, ctx: &PromptContext) {
    prompt.push_str("### Streamer Profile (방송 설정)\n");
    prompt.push_str(&format!("방송 닉네임: {}\n", streamer_nickname(ctx)));
    prompt.push_str(&format!(
        "컨셉/캐릭터: {}\n",
        or_placeholder(&ctx.profile.concept, "(설정되지 않음)")
    ));
    prompt.push_str(&format!(
        "옷차림/외모: {}\n\n",
        or_placeholder(&ctx.profile.outfit, "(설정되지 않음)")
    ));
}

fn push_currency(prompt: &mut String, ctx: &PromptContext) {
    let info = ctx.settings.currency.info();
    prompt.push_str("### Currency & Region Setting\n");
    prompt.push_str(&format!("Currency: {} ({})\n", info.symbol, info.name));
    prompt.push_str(&format!(
        "Viewer Region: {} ({} viewers)\n\n",
        info.region, info.locale
    ));
}

fn push_stream_rules(prompt: &mut String, ctx: &PromptContext, action: &str) {
    let info = ctx.settings.currency.info();
    let nick = streamer_nickname(ctx);
    let concept = or_placeholder(&ctx.profile.concept, "(설정되지 않음)");
    let outfit = or_placeholder(&ctx.profile.outfit, "(설정되지 않음)");
    let title = or_placeholder(ctx.title, "Untitled Stream");
    let viewers = ctx.viewer_count;

    prompt.push_str("### FLING LIVE STREAMING SYSTEM PROMPT\n\n");
    prompt.push_str(&format!(
        "You are generating viewer chat reactions for {nick}'s Fling livestream.\n\
The viewers are from {} region.\n\n\
Stream Title: \"{title}\"\n\
Streamer's Current Followers: {}\n\
Current Viewers: {viewers}\n\
Current Action: \"{action}\"\n\n",
        info.region, ctx.follower_count
    ));

    prompt.push_str(&format!(
        "### OUTPUT FORMAT\n\
FIRST LINE MUST BE viewer count in this format:\n\
[VIEWERS: number]\n\n\
Then generate 3-8 chat messages. Each line should be ONE chat message in this format:\n\
[username]: message\n\n\
For donations, use this format (use {sym} symbol):\n\
[username] donated {sym}X: donation message\n\n",
        sym = info.symbol
    ));

    prompt.push_str(&format!(
        "### RULES\n\
1. FIRST decide viewer count. Start from current viewers ({viewers}) and adjust based on content interest. Output [VIEWERS: X] first.\n\
2. All chat messages MUST be in Korean (한국어) - viewers are typing in Korean regardless of their nationality\n\
3. Usernames should be {style}\n\
4. Mix of reactions: excited, funny, supportive, teasing, questions\n\
5. DONATIONS (in {sym} {name}):\n\
   - Regular donations: {sym}{small} (occasional)\n\
   - Medium donations: {sym}{medium} (rare)\n\
   - BIG JACKPOT donations: {sym}{big} (VERY RARE - only when content is EXTREMELY exciting)\n\
   - Consider if a contact is watching and has strong feelings for {nick} - they might donate big!\n\
6. If a registered contact would realistically watch this stream (based on their personality and relationship with {nick}), they MAY appear in chat using their actual name. Fans/lovers may donate big!\n\
7. Chat should feel natural and varied - not everyone reacts the same way\n\
8. Consider the streamer's concept ({concept}) and outfit ({outfit}) when generating reactions\n\
9. Consider the action {nick} is doing and react appropriately\n\
10. Some messages can be emotes/reactions: ㅋㅋㅋ, ㅠㅠ, ㄷㄷ, 헐, 와, 대박, ㄹㅇ, ㅇㅈ 등\n\
11. NO English in chat messages except for usernames - everything else in Korean\n\
12. Do NOT generate {nick}'s responses - only viewer chat\n\
13. Viewer count changes naturally - interesting/provocative content = viewers increase, boring = decrease\n\
14. NEVER use quotation marks (\"\") in chat messages - speak naturally without quotes\n\
15. NEVER wrap messages in quotes - just write the message directly\n\n\
### Generate [VIEWERS: X] first, then viewer chat:",
        style = info.username_style,
        sym = info.symbol,
        name = info.name,
        small = info.small_donation,
        medium = info.medium_donation,
        big = info.big_donation,
    ));
}

/// Newest host messages that fit the token budget, returned oldest first.
pub fn story_context(history: &[HostChatEntry], max_tokens: usize) -> Vec<ChatMessage> {
    let mut collected = Vec::new();
    let mut used = 0usize;

    for m in history.iter().rev() {
        let estimated = (m.mes.chars().count() as f64 / CHARS_PER_TOKEN).ceil() as usize;
        if used + estimated > max_tokens {
            break;
        }
        collected.push(if m.is_user {
            ChatMessage::user(m.mes.clone())
        } else {
            ChatMessage::assistant(m.mes.clone())
        });
        used += estimated;
    }

    collected.reverse();
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::contact::Contact;
    use crate::model::currency::Currency;
    use crate::model::message::{HostChatExtra, Role};

    fn entry(name: &str, is_user: bool, mes: &str) -> HostChatEntry {
        HostChatEntry {
            name: name.into(),
            is_user,
            is_system: false,
            send_date: 0,
            mes: mes.into(),
            extra: HostChatExtra::default(),
        }
    }

    #[test]
    fn story_context_respects_budget() {
        // 10 chars -> 4 tokens each
        let history = vec![
            entry("a", true, "0123456789"),
            entry("b", false, "abcdefghij"),
            entry("c", true, "ABCDEFGHIJ"),
        ];
        let ctx = story_context(&history, 8);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].content, "abcdefghij");
        assert_eq!(ctx[0].role, Role::Assistant);
        assert_eq!(ctx[1].role, Role::User);

        assert!(story_context(&history, 3).is_empty());
    }

    #[test]
    fn prompt_layout() {
        let settings = FlingSettings {
            user_name: "하나".into(),
            prefill: "[VIEWERS:".into(),
            currency: Currency::Usd,
            ..Default::default()
        };
        let profile = StreamerProfile {
            nickname: "하나짱".into(),
            ..Default::default()
        };
        let roster = ContactRoster::new(vec![Contact {
            name: "Mina".into(),
            persona: "shy classmate".into(),
            tags: String::new(),
        }]);
        let history = vec![entry("Mina", false, "안녕")];
        let ctx = PromptContext {
            settings: &settings,
            profile: &profile,
            roster: &roster,
            history: &history,
            title: "첫 방송",
            follower_count: 12,
            viewer_count: 40,
        };

        let messages = build_viewer_prompt(&ctx, "웨이브한다");
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::Assistant, Role::User, Role::Assistant]
        );

        let system = &messages[0].content;
        assert!(system.contains("- Mina: shy classmate / Tags: none"));
        assert!(system.contains("Mina: 안녕"));
        assert!(system.contains("방송 닉네임: 하나짱"));
        assert!(system.contains("[username] donated $X: donation message"));
        assert!(system.contains("Current Viewers: 40"));
        assert!(system.contains("Current Action: \"웨이브한다\""));

        assert_eq!(
            messages[2].content,
            "[하나's action on stream]: 웨이브한다\n\nGenerate viewer chat reactions in Korean:"
        );
        assert_eq!(messages[3].content, "[VIEWERS:");
    }

    #[test]
    fn empty_sections_use_placeholders() {
        let settings = FlingSettings::default();
        let profile = StreamerProfile::default();
        let roster = ContactRoster::default();
        let ctx = PromptContext {
            settings: &settings,
            profile: &profile,
            roster: &roster,
            history: &[],
            title: "",
            follower_count: 0,
            viewer_count: 0,
        };
        let messages = build_viewer_prompt(&ctx, "x");
        assert_eq!(messages.len(), 2);
        let system = &messages[0].content;
        assert!(system.contains("(No contacts registered)"));
        assert!(system.contains("(No recent history)"));
        assert!(system.contains("Stream Title: \"Untitled Stream\""));
        assert!(system.contains("방송 닉네임: User"));
    }
}
