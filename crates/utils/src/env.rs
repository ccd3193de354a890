// Copyright 2024 Irreducible Inc.

const TRUTHY: [&str; 4] = ["1", "on", "true", "yes"];

/// Read boolean flag from the environment variable.
///
/// `1`, `on`, `true` and `yes` in any letter case enable the flag; anything else, including an
/// unset or non-unicode variable, leaves it off.
pub fn boolean_env_flag_set(flag: &str) -> bool {
	std::env::var(flag).is_ok_and(|val| is_truthy(&val))
}

/// Read a positive count from the environment variable, ignoring unparsable values.
pub fn count_env_var(name: &str) -> Option<usize> {
	std::env::var(name)
		.ok()
		.and_then(|val| val.trim().parse::<usize>().ok())
		.filter(|&count| count > 0)
}

fn is_truthy(val: &str) -> bool {
	let val = val.trim();
	TRUTHY.iter().any(|truthy| truthy.eq_ignore_ascii_case(val))
}
