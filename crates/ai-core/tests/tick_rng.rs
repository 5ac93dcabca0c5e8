use ai_core::{DeterministicRng, TickContext};

#[test]
fn agent_rng_is_stable_per_tick_and_agent() {
    let ctx = TickContext::new(12, 1_200, 99);

    let mut a = ctx.rng_for_agent(3u64, 0);
    let mut b = ctx.rng_for_agent(3u64, 0);
    assert_eq!(a.next_u64(), b.next_u64());

    let mut other_agent = ctx.rng_for_agent(4u64, 0);
    let mut other_stream = ctx.rng_for_agent(3u64, 1);
    let x = ctx.rng_for_agent(3u64, 0).next_u64();
    assert_ne!(x, other_agent.next_u64());
    assert_ne!(x, other_stream.next_u64());
}

#[test]
fn agent_rng_changes_between_ticks() {
    let first = TickContext::new(1, 100, 5).rng_for_agent(1u32, 0).next_u64();
    let second = TickContext::new(2, 200, 5).rng_for_agent(1u32, 0).next_u64();
    assert_ne!(first, second);
}
