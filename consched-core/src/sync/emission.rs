//! Push-based result stream between a sync worker and its consumer.
//!
//! A stream is any number of `Next` values followed by exactly one terminal
//! message (`Error` or `Completed`). [`Emitter`] enforces that shape no
//! matter what the producer does.

use tokio::sync::mpsc;

use crate::error::SchedError;

#[derive(Debug)]
pub enum Emission<T> {
    Next(T),
    Error(SchedError),
    Completed,
}

impl<T> Emission<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Emission::Next(_))
    }
}

/// Receives the emissions of one worker invocation.
pub trait Subscriber<T>: Send {
    fn on_next(&mut self, value: T);
    fn on_error(&mut self, error: SchedError);
    fn on_completed(&mut self);
}

/// Wraps a subscriber and guarantees the stream contract.
pub struct Emitter<'a, T, S: Subscriber<T> + ?Sized> {
    subscriber: &'a mut S,
    terminated: bool,
    emitted: usize,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<'a, T, S: Subscriber<T> + ?Sized> Emitter<'a, T, S> {
    pub fn new(subscriber: &'a mut S) -> Self {
        Emitter {
            subscriber,
            terminated: false,
            emitted: 0,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn next(&mut self, value: T) {
        if self.terminated {
            tracing::warn!("dropping value emitted after stream terminated");
            return;
        }
        self.emitted += 1;
        self.subscriber.on_next(value);
    }

    pub fn error(&mut self, error: SchedError) {
        if self.terminated {
            tracing::warn!(%error, "dropping error emitted after stream terminated");
            return;
        }
        self.terminated = true;
        self.subscriber.on_error(error);
    }

    pub fn complete(&mut self) {
        if self.terminated {
            tracing::warn!("dropping completion emitted after stream terminated");
            return;
        }
        self.terminated = true;
        self.subscriber.on_completed();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Number of `Next` values delivered so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

/// Records every emission, in order.
#[derive(Debug)]
pub struct CollectingSubscriber<T> {
    pub emissions: Vec<Emission<T>>,
}

impl<T> Default for CollectingSubscriber<T> {
    fn default() -> Self {
        CollectingSubscriber {
            emissions: Vec::new(),
        }
    }
}

impl<T> CollectingSubscriber<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `Next` values, in emission order.
    pub fn values(&self) -> Vec<&T> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Next(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn error(&self) -> Option<&SchedError> {
        self.emissions.iter().find_map(|e| match e {
            Emission::Error(err) => Some(err),
            _ => None,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.emissions
            .iter()
            .any(|e| matches!(e, Emission::Completed))
    }
}

impl<T: Send> Subscriber<T> for CollectingSubscriber<T> {
    fn on_next(&mut self, value: T) {
        self.emissions.push(Emission::Next(value));
    }

    fn on_error(&mut self, error: SchedError) {
        self.emissions.push(Emission::Error(error));
    }

    fn on_completed(&mut self) {
        self.emissions.push(Emission::Completed);
    }
}

/// Adapts a closure taking [`Emission`]s into a [`Subscriber`].
pub struct FnSubscriber<F>(pub F);

impl<T, F> Subscriber<T> for FnSubscriber<F>
where
    F: FnMut(Emission<T>) + Send,
{
    fn on_next(&mut self, value: T) {
        (self.0)(Emission::Next(value))
    }

    fn on_error(&mut self, error: SchedError) {
        (self.0)(Emission::Error(error))
    }

    fn on_completed(&mut self) {
        (self.0)(Emission::Completed)
    }
}

/// Sending half of an emission channel.
#[derive(Debug)]
pub struct ChannelSubscriber<T> {
    tx: mpsc::UnboundedSender<Emission<T>>,
}

/// Receiving half of an emission channel.
#[derive(Debug)]
pub struct EmissionStream<T> {
    rx: mpsc::UnboundedReceiver<Emission<T>>,
}

/// Build a subscriber whose emissions can be consumed from another task.
pub fn channel<T>() -> (ChannelSubscriber<T>, EmissionStream<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSubscriber { tx }, EmissionStream { rx })
}

impl<T: Send> ChannelSubscriber<T> {
    fn send(&self, emission: Emission<T>) {
        // A dropped receiver just means nobody is listening anymore
        if self.tx.send(emission).is_err() {
            tracing::debug!("emission receiver dropped");
        }
    }
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_next(&mut self, value: T) {
        self.send(Emission::Next(value));
    }

    fn on_error(&mut self, error: SchedError) {
        self.send(Emission::Error(error));
    }

    fn on_completed(&mut self) {
        self.send(Emission::Completed);
    }
}

impl<T> EmissionStream<T> {
    /// Next emission; `None` once the stream has terminated or the sender
    /// is gone.
    pub async fn recv(&mut self) -> Option<Emission<T>> {
        self.rx.recv().await
    }

    /// Drain the stream up to and including its terminal message.
    pub async fn collect(mut self) -> Vec<Emission<T>> {
        let mut out = Vec::new();
        while let Some(emission) = self.rx.recv().await {
            let terminal = emission.is_terminal();
            out.push(emission);
            if terminal {
                break;
            }
        }
        out
    }
}
