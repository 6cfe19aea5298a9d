//! Rationale composer
//!
//! Renders the three explanation strings from a finished [`DecisionTrace`].
//! Nothing here recomputes a decision input; every number printed is read
//! from the trace.

use crate::brain::decision::TradeAction;
use crate::brain::engine::DecisionTrace;
use crate::brain::weighting::SignalBasis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rationale {
    pub reasoning: String,
    pub technical_analysis: String,
    pub risk_assessment: String,
}

/// Trend word for a normalized trend signal
pub fn trend_word(trend: f64) -> &'static str {
    if trend > 0.1 {
        "bullish"
    } else if trend < -0.1 {
        "bearish"
    } else {
        "sideways"
    }
}

fn read_word(signal: f64, threshold: f64) -> &'static str {
    if signal > threshold {
        "bullish"
    } else if signal < -threshold {
        "bearish"
    } else {
        "inconclusive"
    }
}

pub fn compose(trace: &DecisionTrace) -> Rationale {
    Rationale {
        reasoning: reasoning(trace),
        technical_analysis: technical_analysis(trace),
        risk_assessment: risk_assessment(trace),
    }
}

fn reasoning(trace: &DecisionTrace) -> String {
    let r = &trace.resolution;
    // The read is the signal before any activity nudge
    let read = trace.personality.after;
    let mut text = format!(
        "{} agent ({} mode) reads the market as {}: signal {:+.3} against threshold ±{:.3}, so {}.",
        trace.personality.personality.display_name(),
        trace.mode.display_name(),
        read_word(read, r.threshold),
        read,
        r.threshold,
        r.action,
    );

    let dominant = trace
        .dna
        .dominant_traits(2)
        .iter()
        .map(|(t, v)| format!("{} ({:.0})", t.display_name(), v))
        .collect::<Vec<_>>()
        .join(" and ");
    text.push_str(&format!(" Dominant traits: {}.", dominant));

    if let SignalBasis::Basic(votes) = &trace.weighted.basis {
        if let Some(rule) = votes.rule {
            text.push_str(&format!(
                " The {} rule fired, taking the votes from {:+.3} to {:+.3}.",
                rule.display_name(),
                votes.vote_sum,
                votes.total,
            ));
        }
    }

    if let Some(factor) = trace.weighted.contrarian_factor {
        text.push_str(&format!(
            " Contrarian bias {:.0} faded the read by factor {:.2} ({:+.3} to {:+.3}).",
            trace.dna.contrarian_bias, factor, trace.weighted.pre_contrarian, trace.weighted.raw_signal,
        ));
    }

    let p = &trace.personality;
    text.push_str(&format!(
        " Personality: {} ({:+.3} to {:+.3}).",
        p.note, p.before, p.after
    ));

    if trace.activity_nudge && r.action != TradeAction::Hold {
        text.push_str(&format!(
            " No threshold was crossed; activity bias took a minor {} position (signal moved to {:+.3}).",
            r.action, trace.final_signal,
        ));
    }
    if r.forced_exit {
        text.push_str(&format!(
            " Stop-loss trigger hit at {:+.2}% over 24h, exiting the position.",
            trace.price_change_24h
        ));
    }
    text
}

fn technical_analysis(trace: &DecisionTrace) -> String {
    let s = &trace.signals;
    let head = format!(
        "24h trend {} ({:+.2}%), price at {:.0}% of the daily range, volatility {:.1}%.",
        trend_word(s.trend),
        trace.price_change_24h,
        s.price_position * 100.0,
        s.volatility * 100.0,
    );

    match &trace.weighted.basis {
        SignalBasis::Full(blend) => format!(
            "{} RSI signal {:+.2}, MACD signal {:+.2}, MA signal {:+.2}, momentum {:+.2}. \
             Technical score {:+.3} weighted {:.2}, intuitive score {:+.3} weighted {:.2}.",
            head,
            s.rsi_signal,
            s.macd_signal,
            s.ma_signal,
            s.momentum,
            blend.technical_score,
            blend.pattern_weight,
            blend.intuitive_score,
            1.0 - blend.pattern_weight,
        ),
        SignalBasis::Basic(votes) => {
            let t = &votes.thresholds;
            format!(
                "{} Dip threshold {:+.2}%, profit threshold {:+.2}%, buy zone below {:.0}%, \
                 sell zone above {:.0}%. Votes: dip {:+.2}, profit {:+.2}, buy zone {:+.2}, \
                 sell zone {:+.2}, RSI {:+.2}; sum {:+.3}, net {:+.3}.",
                head,
                t.dip_pct,
                t.profit_pct,
                t.buy_zone * 100.0,
                t.sell_zone * 100.0,
                votes.dip,
                votes.profit,
                votes.buy_zone,
                votes.sell_zone,
                votes.rsi,
                votes.vote_sum,
                votes.total,
            )
        }
    }
}

fn risk_assessment(trace: &DecisionTrace) -> String {
    let r = &trace.resolution;
    let risk = &r.risk;
    let head = format!("Risk tolerance {:.0}:", trace.dna.risk_tolerance);

    match (r.action, r.stop_loss, r.take_profit) {
        (TradeAction::Hold, _, _) | (_, None, _) | (_, _, None) => format!(
            "{} no trade, a {:.1}% stop-loss and {:.1}% take-profit would apply. Confidence {:.1}%.",
            head, risk.stop_loss_pct, risk.take_profit_pct, r.confidence,
        ),
        (action, Some(stop_loss), Some(take_profit)) => {
            let sizing = match action {
                TradeAction::Sell => "of held tokens",
                _ => "of USDC balance",
            };
            format!(
                "{} stop-loss {:.1}% at {:.4}, take-profit {:.1}% at {:.4}. \
                 Sizing {:.2}% {} at {:.1}% confidence.",
                head,
                risk.stop_loss_pct,
                stop_loss,
                risk.take_profit_pct,
                take_profit,
                r.suggested_amount,
                sizing,
                r.confidence,
            )
        }
    }
}
