criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        evaluating_seven_card_hands,
        shuffling_seeded_decks,
        playing_a_passive_hand,
}

fn evaluating_seven_card_hands(c: &mut criterion::Criterion) {
    c.bench_function("evaluate a 7-card Hand", |b| {
        let mut deck = Shuffler::new(42).deck(0);
        let cards = (0..7).map(|_| deck.draw()).collect::<Vec<Card>>();
        let hand = Hand::from(cards);
        b.iter(|| Strength::from(hand))
    });
}

fn shuffling_seeded_decks(c: &mut criterion::Criterion) {
    let shuffler = Shuffler::new(42);
    c.bench_function("shuffle a seeded Deck", |b| {
        let mut hand = 0u64;
        b.iter(|| {
            hand += 1;
            shuffler.deck(hand)
        })
    });
}

fn playing_a_passive_hand(c: &mut criterion::Criterion) {
    c.bench_function("play out a 6-max hand of passive actions", |b| {
        let players = (0..6)
            .map(|i| (i, format!("bot-{}", i), 1000))
            .collect::<Vec<_>>();
        let shuffler = Shuffler::new(42);
        b.iter(|| {
            let deck = shuffler.deck(1);
            let (mut game, _) = Game::deal(1, 0, players.clone(), 5, 10, deck).unwrap();
            while !game.is_complete() {
                let actor = game.actor().unwrap();
                let action = game.passive();
                game.apply(actor, action, Verb::from(action)).unwrap();
            }
            game.pot()
        })
    });
}

use botpoker::cards::Card;
use botpoker::cards::Hand;
use botpoker::cards::Shuffler;
use botpoker::cards::Strength;
use botpoker::gameplay::Game;
use botpoker::gameplay::Verb;
