//! Interactive session driver.
//!
//! The driver walks a [`Client`] through the lobby and then through rounds
//! until the player quits or the server drops the connection. Input comes
//! from a [`LineSource`] and everything the player sees is written to a
//! [`std::io::Write`], so whole sessions can be scripted.
//!
//! Within a round every seat's turn opens with an announcement snapshot.
//! The snapshot after the announcement either asks the seat to act or, if
//! the revealed hand already busted, moves on to the next seat.

use anyhow::Error;
use async_trait::async_trait;
use private_blackjack::{Client, Snapshot, Usd};
use std::{collections::VecDeque, io::Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    commands::{
        BetCommand, LOBBY_HELP, LobbyCommand, TurnCommand, parse_bet_command, parse_lobby_command,
        parse_turn_command,
    },
    render::{render, render_json},
};

/// A source of player input, one line at a time.
#[async_trait]
pub trait LineSource: Send {
    /// The next line without its terminator, or `None` at end of input.
    async fn next_line(&mut self) -> Result<Option<String>, Error>;
}

/// Lines typed on standard input.
pub struct StdinLines {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLines {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for StdinLines {
    async fn next_line(&mut self) -> Result<Option<String>, Error> {
        Ok(self.lines.next_line().await?)
    }
}

/// A fixed script of input lines.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl LineSource for ScriptedLines {
    async fn next_line(&mut self) -> Result<Option<String>, Error> {
        Ok(self.lines.pop_front())
    }
}

/// How a round went for the player, judged by their balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Win(Usd),
    Loss(Usd),
    Tie,
}

impl RoundResult {
    #[must_use]
    pub fn from_money(before: Usd, after: Usd) -> Self {
        match after - before {
            0 => Self::Tie,
            change if change > 0 => Self::Win(change),
            change => Self::Loss(-change),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Win(_) => "win",
            Self::Loss(_) => "loss",
            Self::Tie => "tie",
        }
    }

    fn change(self) -> Usd {
        match self {
            Self::Win(amount) => amount,
            Self::Loss(amount) => -amount,
            Self::Tie => 0,
        }
    }
}

pub struct Driver<L, W> {
    client: Client,
    input: L,
    output: W,
    json: bool,
    /// Room names from the last `list`.
    rooms: Vec<String>,
}

impl<L: LineSource, W: Write> Driver<L, W> {
    pub fn new(client: Client, input: L, output: W) -> Self {
        Self {
            client,
            input,
            output,
            json: false,
            rooms: Vec::new(),
        }
    }

    /// Print snapshots and results as JSON lines instead of text.
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Run the session to completion and return the result of every
    /// finished round.
    ///
    /// # Errors
    ///
    /// Fails when writing output or reading input fails. Losing the server
    /// ends the session normally.
    pub async fn run(mut self) -> Result<Vec<RoundResult>, Error> {
        let results = if self.lobby().await? {
            self.play().await?
        } else {
            Vec::new()
        };
        self.client.close().await;
        Ok(results)
    }

    fn prompt(&mut self, prompt: &str) -> Result<(), Error> {
        if !self.json {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;
        }
        Ok(())
    }

    async fn leave(&mut self) {
        // The server may already be gone.
        let _ = self.client.exit().await;
    }

    /// Returns whether the player got a seat.
    async fn lobby(&mut self) -> Result<bool, Error> {
        if !self.json {
            write!(self.output, "{LOBBY_HELP}")?;
        }
        loop {
            self.prompt("lobby> ")?;
            let Some(line) = self.input.next_line().await? else {
                self.leave().await;
                return Ok(false);
            };
            let command = match parse_lobby_command(&line) {
                Ok(command) => command,
                Err(error) => {
                    writeln!(self.output, "{error}")?;
                    continue;
                }
            };

            let seated = match command {
                LobbyCommand::List => self.list().await,
                LobbyCommand::Create(name) => self.create_and_join(&name).await,
                LobbyCommand::Join(name) => self.join(&name).await,
                LobbyCommand::Enter(name) => {
                    if self.rooms.contains(&name.to_ascii_lowercase()) {
                        self.join(&name).await
                    } else {
                        self.create_and_join(&name).await
                    }
                }
                LobbyCommand::Help => {
                    write!(self.output, "{LOBBY_HELP}")?;
                    continue;
                }
                LobbyCommand::Quit => {
                    self.leave().await;
                    return Ok(false);
                }
            };

            match seated {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(error) => {
                    writeln!(self.output, "Lost the server: {error:#}")?;
                    return Ok(false);
                }
            }
        }
    }

    async fn list(&mut self) -> Result<bool, Error> {
        self.rooms = self.client.list_rooms().await?;
        if self.rooms.is_empty() {
            writeln!(self.output, "No open rooms")?;
        } else {
            writeln!(self.output, "Open rooms: {}", self.rooms.join(", "))?;
        }
        Ok(false)
    }

    /// Returns whether the player got a seat.
    async fn join(&mut self, name: &str) -> Result<bool, Error> {
        if self.client.join_room(name).await? {
            writeln!(self.output, "Joined '{name}', waiting for the other players")?;
            return Ok(true);
        }
        writeln!(self.output, "Couldn't join '{name}'")?;
        Ok(false)
    }

    /// The creator of a room takes the first seat in it.
    async fn create_and_join(&mut self, name: &str) -> Result<bool, Error> {
        if !self.client.create_room(name).await? {
            writeln!(self.output, "Couldn't create room '{name}'")?;
            return Ok(false);
        }
        writeln!(self.output, "Created room '{name}'")?;
        self.join(name).await
    }

    /// Receive and show the next snapshot. `None` once the server is gone.
    async fn recv(&mut self) -> Result<Option<Snapshot>, Error> {
        match self.client.recv_snapshot().await {
            Ok(snapshot) => {
                if self.json {
                    writeln!(self.output, "{}", render_json(&snapshot)?)?;
                } else {
                    writeln!(self.output)?;
                    write!(self.output, "{}", render(&snapshot))?;
                }
                Ok(Some(snapshot))
            }
            Err(error) => {
                writeln!(self.output, "Lost the server: {error:#}")?;
                Ok(None)
            }
        }
    }

    async fn play(&mut self) -> Result<Vec<RoundResult>, Error> {
        let mut results = Vec::new();
        loop {
            // Every round opens with the betting broadcast.
            let Some(opening) = self.recv().await? else {
                return Ok(results);
            };
            if !self.place_bet().await? {
                return Ok(results);
            }
            let Some(payout) = self.play_hand().await? else {
                return Ok(results);
            };

            if let (Some(before), Some(after)) = (opening.own_money(), payout.own_money()) {
                let result = RoundResult::from_money(before, after);
                self.report(result, after)?;
                results.push(result);
            }
        }
    }

    /// Returns whether the bet was accepted. Quitting and losing the
    /// server both end the session.
    async fn place_bet(&mut self) -> Result<bool, Error> {
        loop {
            self.prompt("bet> ")?;
            let Some(line) = self.input.next_line().await? else {
                self.leave().await;
                return Ok(false);
            };
            match parse_bet_command(&line) {
                Ok(BetCommand::Bet(amount)) => {
                    if let Err(error) = self.client.bet(amount).await {
                        writeln!(self.output, "Lost the server: {error:#}")?;
                        return Ok(false);
                    }
                    let Some(snapshot) = self.recv().await? else {
                        return Ok(false);
                    };
                    if !snapshot.is_bet_prompt() {
                        return Ok(true);
                    }
                    writeln!(self.output, "Bet rejected, bets must be positive")?;
                }
                Ok(BetCommand::Quit) => {
                    self.leave().await;
                    return Ok(false);
                }
                Err(error) => writeln!(self.output, "{error}")?,
            }
        }
    }

    /// Play until the payout snapshot arrives and return it.
    async fn play_hand(&mut self) -> Result<Option<Snapshot>, Error> {
        let mut announced = false;
        loop {
            let Some(snapshot) = self.recv().await? else {
                return Ok(None);
            };
            if snapshot.new_round {
                return Ok(Some(snapshot));
            }
            if !snapshot.is_my_turn() {
                continue;
            }
            if !announced {
                announced = true;
                continue;
            }
            if !self.take_turn().await? {
                return Ok(None);
            }
        }
    }

    /// Send one hit or stand. Returns `false` if the session ended.
    async fn take_turn(&mut self) -> Result<bool, Error> {
        loop {
            self.prompt("hit or stand> ")?;
            let Some(line) = self.input.next_line().await? else {
                self.leave().await;
                return Ok(false);
            };
            let sent = match parse_turn_command(&line) {
                Ok(TurnCommand::Hit) => self.client.hit().await,
                Ok(TurnCommand::Stand) => self.client.stand().await,
                Ok(TurnCommand::Quit) => {
                    self.leave().await;
                    return Ok(false);
                }
                Err(error) => {
                    writeln!(self.output, "{error}")?;
                    continue;
                }
            };
            return match sent {
                Ok(()) => Ok(true),
                Err(error) => {
                    writeln!(self.output, "Lost the server: {error:#}")?;
                    Ok(false)
                }
            };
        }
    }

    fn report(&mut self, result: RoundResult, money: Usd) -> Result<(), Error> {
        if self.json {
            let line = serde_json::json!({
                "result": result.label(),
                "change": result.change(),
                "money": money,
            });
            writeln!(self.output, "{line}")?;
            return Ok(());
        }
        match result {
            RoundResult::Win(amount) => writeln!(self.output, "You win ${amount}, now ${money}")?,
            RoundResult::Loss(amount) => writeln!(self.output, "You lose ${amount}, now ${money}")?,
            RoundResult::Tie => writeln!(self.output, "Tie, still ${money}")?,
        }
        Ok(())
    }
}
