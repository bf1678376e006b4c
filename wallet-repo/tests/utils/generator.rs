use fake::faker::lorem::en::Words;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use wallet_repo::transaction_repo::NewTransaction;

pub trait Generator<T> {
    fn gen(&mut self) -> T;
}

pub struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    pub fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos].clone();
        self.current_pos += 1;
        v
    }
}

pub struct RandomSample<T> {
    values: Vec<T>,
}

impl<T> RandomSample<T> {
    pub fn boxed(values: Vec<T>) -> Box<RandomSample<T>> {
        Box::new(RandomSample { values })
    }
}

impl<T: Clone> Generator<T> for RandomSample<T> {
    fn gen(&mut self) -> T {
        self.values.choose(&mut rand::thread_rng()).unwrap().clone()
    }
}

struct FakeTitle;

impl Generator<String> for FakeTitle {
    fn gen(&mut self) -> String {
        let words: Vec<String> = Words(1..4).fake();
        words.join(" ")
    }
}

/// Positive amounts with two decimal places, so generated transactions never overdraw.
struct FakeIncome;

impl Generator<Decimal> for FakeIncome {
    fn gen(&mut self) -> Decimal {
        Decimal::new(rand::thread_rng().gen_range(1..1_000_000), 2)
    }
}

#[allow(dead_code)]
pub struct NewTransactionGenerator {
    wallet_id: i32,
    title_gen: Box<dyn Generator<String>>,
    amnt_gen: Box<dyn Generator<Decimal>>,
    cat_gen: Box<dyn Generator<i32>>,
    tag_gen: Box<dyn Generator<BTreeSet<i32>>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn new(wallet_id: i32, category_id: i32) -> NewTransactionGenerator {
        NewTransactionGenerator {
            wallet_id,
            title_gen: Box::new(FakeTitle),
            amnt_gen: Box::new(FakeIncome),
            cat_gen: RandomSample::boxed(vec![category_id]),
            tag_gen: RandomSample::boxed(vec![BTreeSet::new()]),
        }
    }

    pub fn with_categories(mut self, categories: Vec<i32>) -> NewTransactionGenerator {
        self.cat_gen = RandomSample::boxed(categories);
        self
    }

    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewTransactionGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn with_tags(mut self, tags: Vec<BTreeSet<i32>>) -> NewTransactionGenerator {
        self.tag_gen = Predefined::boxed(tags);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.title_gen.gen(),
            self.amnt_gen.gen(),
            self.cat_gen.gen(),
            self.wallet_id,
            self.tag_gen.gen(),
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}
