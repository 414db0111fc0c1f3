//! Minimal IRC line codec for Twitch chat.
//!
//! Only the handful of commands the bot reacts to are decoded; everything
//! else comes back as [`IrcLine::Other`].

/// A decoded server line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcLine {
    /// Keepalive that must be answered with `PONG`
    Ping(String),
    /// Chat message in a channel
    Privmsg {
        user: String,
        channel: String,
        text: String,
    },
    /// Server notice, e.g. a failed login
    Notice(String),
    /// Server asks the client to reconnect
    Reconnect,
    Other,
}

impl IrcLine {
    pub fn parse(line: &str) -> Self {
        parse_parts(line).unwrap_or(IrcLine::Other)
    }
}

fn parse_parts(line: &str) -> Option<IrcLine> {
    let mut rest = line.trim_end_matches(['\r', '\n']);

    // IRCv3 tags are not used
    if let Some(tagged) = rest.strip_prefix('@') {
        rest = tagged.split_once(' ')?.1;
    }

    let mut prefix = None;
    if let Some(prefixed) = rest.strip_prefix(':') {
        let (p, r) = prefixed.split_once(' ')?;
        prefix = Some(p);
        rest = r;
    }

    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
    let line = match command {
        "PING" => IrcLine::Ping(params.trim_start_matches(':').to_string()),
        "PRIVMSG" => {
            let (channel, text) = params.split_once(" :")?;
            let nick = prefix?.split('!').next()?;
            IrcLine::Privmsg {
                user: nick.to_lowercase(),
                channel: channel.trim().to_string(),
                text: text.to_string(),
            }
        }
        "NOTICE" => IrcLine::Notice(
            params
                .split_once(" :")
                .map_or(params, |(_, text)| text)
                .to_string(),
        ),
        "RECONNECT" => IrcLine::Reconnect,
        _ => IrcLine::Other,
    };
    Some(line)
}

/// `PRIVMSG` line for `channel`; line breaks in `text` are flattened
pub fn privmsg(channel: &str, text: &str) -> String {
    let text: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    format!("PRIVMSG {} :{}", channel, text)
}

pub fn pong(token: &str) -> String {
    format!("PONG :{}", token)
}
